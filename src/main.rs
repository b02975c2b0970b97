//! moodplay - a mood-driven music player client
//!
//! Captures a still frame from the camera feed, asks the mood service what
//! you look like, fetches a matching playlist, and plays it. The playback
//! state machine lives in `session`; this file is only wiring plus a thin
//! stdin command adapter.

mod api;
mod capture;
mod config;
mod error;
mod player;
mod session;
mod transport;
mod utils;

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use api::MoodApi;
use capture::{FileFrameSource, FrameSource};
use config::Config;
use player::{MediaSink, RodioSink};
use session::{SessionController, SessionEvent, SessionEventReceiver, session_event_channel};
use transport::{HttpResolver, Resolver};
use utils::capitalize;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    tracing::info!(
        "mood service at {}, resolution strategy {}",
        config.base_url,
        config.strategy
    );

    let api = MoodApi::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let resolver = HttpResolver::new(api.clone(), config.strategy);
    let frames = FileFrameSource::new(config.frame_path.clone());
    let sink = RodioSink::new()?;

    let (events_tx, events_rx) = session_event_channel();
    let mut session =
        SessionController::new(sink, resolver, frames, api, config.volume, events_tx);

    tokio::spawn(render_events(events_rx));

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            _ = ticker.tick() => session.on_tick().await,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&mut session, line.trim()).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Map one command line to a controller method; false means quit
async fn handle_command<S, R, F>(session: &mut SessionController<S, R, F>, command: &str) -> bool
where
    S: MediaSink,
    R: Resolver,
    F: FrameSource,
{
    let (cmd, arg) = match command.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (command, ""),
    };

    match cmd {
        "" => {}
        "detect" | "d" => session.detect_mood().await,
        "mood" if !arg.is_empty() => session.load_recommendations(arg).await,
        "mood" => println!("usage: mood <label>"),
        "play" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => session.play_index(n - 1).await,
            _ => println!("usage: play <number>"),
        },
        "pause" | "p" => session.toggle_play(),
        "next" | "n" => session.next().await,
        "prev" => session.prev().await,
        "seek" => match arg.parse::<f64>() {
            Ok(fraction) => session.seek_fraction(fraction),
            Err(_) => println!("usage: seek <0.0-1.0>"),
        },
        "vol" => match arg.parse::<f32>() {
            Ok(volume) => session.set_volume(volume),
            Err(_) => println!("usage: vol <0.0-1.0>"),
        },
        "shuffle" => {
            let on = session.toggle_shuffle();
            println!("shuffle {}", if on { "on" } else { "off" });
        }
        "repeat" => {
            let on = session.toggle_repeat();
            println!("repeat {}", if on { "on" } else { "off" });
        }
        "list" | "ls" => {
            if session.playlist().is_empty() {
                println!("(empty playlist - try `detect`)");
            }
            for (idx, track) in session.playlist().tracks().iter().enumerate() {
                let marker = if session.playlist().cursor() == Some(idx) {
                    ">"
                } else {
                    " "
                };
                println!("{} {}. {} - {}", marker, idx + 1, track.title, track.artist);
            }
        }
        "status" => {
            let info = session.sink_info();
            let secs = info.position.as_secs();
            match session.playlist().current() {
                Some(track) => println!(
                    "[{}] {} - {} ({}:{:02} in, vol {:.1}, mood {})",
                    session.phase(),
                    track.title,
                    track.artist,
                    secs / 60,
                    secs % 60,
                    info.volume,
                    capitalize(session.mood()),
                ),
                None => println!(
                    "[{}] no track (mood {})",
                    session.phase(),
                    capitalize(session.mood())
                ),
            }
        }
        "moods" => session.refresh_mood_history().await,
        "songs" => session.refresh_song_history().await,
        "help" | "?" => print_help(),
        "quit" | "exit" | "q" => return false,
        other => println!("unknown command: {} (try `help`)", other),
    }

    true
}

/// Print session events as they arrive
async fn render_events(mut events: SessionEventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Phase { phase } => tracing::debug!("session phase: {}", phase),
            SessionEvent::TrackChanged {
                index,
                title,
                artist,
            } => println!("> now playing [{}] {} - {}", index + 1, title, artist),
            SessionEvent::PlaylistReplaced { count } => {
                println!("> playlist replaced: {} songs", count)
            }
            SessionEvent::MoodDetected {
                mood,
                confidence_text,
            } => println!("> mood: {} ({})", capitalize(&mood), confidence_text),
            SessionEvent::MoodNotDetected => println!("> mood not detected, try again"),
            SessionEvent::Warning { message } => println!("! {}", message),
            SessionEvent::MoodHistory { entries } => {
                println!("> mood history:");
                for entry in entries {
                    println!(
                        "  {}  {}",
                        entry.detected_at.format("%Y-%m-%d %H:%M"),
                        capitalize(&entry.mood)
                    );
                }
            }
            SessionEvent::SongHistory { entries } => {
                println!("> recently played:");
                for entry in entries {
                    println!(
                        "  {}  {} - {}",
                        entry.played_at.format("%Y-%m-%d %H:%M"),
                        entry.title,
                        entry.artist
                    );
                }
            }
        }
    }
}

fn print_help() {
    println!("moodplay commands:");
    println!("  detect          capture a frame and detect your mood");
    println!("  mood <label>    fetch a playlist for a mood directly");
    println!("  play <n>        play the n-th song of the playlist");
    println!("  pause           toggle play/pause");
    println!("  next / prev     skip forward / back");
    println!("  seek <0-1>      scrub within the current song");
    println!("  vol <0-1>       set volume");
    println!("  shuffle         toggle shuffle");
    println!("  repeat          toggle repeat");
    println!("  list            show the playlist");
    println!("  status          show what is playing");
    println!("  moods / songs   show detection / playback history");
    println!("  quit            exit");
}
