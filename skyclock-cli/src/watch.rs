use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use skyclock_core::{
    CandidateLocation, Config, Resolver, SkyError, SkyRenderer, SuggestionFeed, Viewport,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{Instant, MissedTickBehavior, interval, interval_at},
};

use crate::render;

const TICK: Duration = Duration::from_secs(1);

/// One line typed while watching.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchInput {
    Quit,
    CurrentPosition,
    Search(String),
    Pick(usize),
    Resize(Viewport),
    Typing(String),
}

/// `WIDTHxHEIGHT`, both positive.
fn parse_size(text: &str) -> Option<Viewport> {
    let (width, height) = text.trim().split_once(['x', 'X'])?;
    let width: f64 = width.trim().parse().ok()?;
    let height: f64 = height.trim().parse().ok()?;
    (width > 0.0 && height > 0.0).then(|| Viewport::new(width, height))
}

impl WatchInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "q" => Self::Quit,
            "@" => Self::CurrentPosition,
            _ => {
                if let Some(size) = line.strip_prefix(":size").and_then(parse_size) {
                    return Self::Resize(size);
                }
                if let Some(query) = line.strip_prefix('/') {
                    return Self::Search(query.trim().to_string());
                }
                match line.strip_prefix('#').map(str::parse::<usize>) {
                    Some(Ok(n)) if n > 0 => Self::Pick(n - 1),
                    _ => Self::Typing(line.to_string()),
                }
            }
        }
    }
}

fn report_error(err: &SkyError) {
    eprintln!("error: {}", err.user_message());
    tracing::debug!(error = %err, "Resolver error");
}

/// Print a status line every second until `q` or Ctrl-C.
///
/// Network work runs on spawned tasks so the tick never waits on it.
pub async fn run(
    resolver: Resolver,
    config: &Config,
    mut renderer: SkyRenderer,
    startup: Option<CandidateLocation>,
    use_device_position: bool,
) -> Result<()> {
    {
        let resolver = resolver.clone();
        tokio::spawn(async move {
            let result = if use_device_position {
                resolver.resolve_current_position().await
            } else {
                resolver.resolve_startup(startup.as_ref()).await
            };
            if let Err(e) = result {
                report_error(&e);
            }
        });
    }

    let (mut feed, mut suggestions) = SuggestionFeed::new(resolver.clone(), config.debounce());

    let mut tick = interval(TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let period = config.refresh_interval();
    let mut refresh = interval_at(Instant::now() + period, period);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!(
        "Type a place for suggestions, #n to pick, /query to search, \
         @ for current position, :size WxH to resize, q to quit."
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let state = resolver.state().snapshot().await;
                let frame = renderer.frame(Utc::now(), &state);
                println!("{}", render::status_line(&frame, &state));
            }
            _ = refresh.tick() => {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    if !resolver.refresh().await {
                        tracing::debug!("No location yet, skipping weather refresh");
                    }
                });
            }
            Ok(()) = suggestions.changed() => {
                let list = suggestions.borrow_and_update().clone();
                if !list.is_empty() {
                    println!("{}", render::suggestion_list(&list));
                }
            }
            line = lines.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input");
                        stdin_open = false;
                        continue;
                    }
                };

                match WatchInput::parse(&line) {
                    WatchInput::Quit => break,
                    WatchInput::Typing(text) => feed.input(&text),
                    WatchInput::Resize(viewport) => {
                        renderer.resize(viewport);
                        let Viewport { width, height } = renderer.viewport();
                        println!("Viewport is now {width}x{height}");
                    }
                    WatchInput::CurrentPosition => {
                        feed.clear();
                        let resolver = resolver.clone();
                        tokio::spawn(async move {
                            if let Err(e) = resolver.resolve_current_position().await {
                                report_error(&e);
                            }
                        });
                    }
                    WatchInput::Search(query) => {
                        feed.clear();
                        if query.is_empty() {
                            continue;
                        }
                        let resolver = resolver.clone();
                        tokio::spawn(async move {
                            if let Err(e) = resolver.search(&query).await {
                                report_error(&e);
                            }
                        });
                    }
                    WatchInput::Pick(index) => {
                        let Some(candidate) = feed.current().get(index).cloned() else {
                            eprintln!("error: no suggestion #{}", index + 1);
                            continue;
                        };
                        feed.clear();
                        let resolver = resolver.clone();
                        tokio::spawn(async move {
                            if let Err(e) = resolver.select(&candidate).await {
                                report_error(&e);
                            }
                        });
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
