use skyclock_core::{
    AppState, CandidateLocation,
    sky::{Precipitation, SkyFrame, TimeOfDay},
};

fn time_of_day_label(time_of_day: TimeOfDay) -> &'static str {
    match time_of_day {
        TimeOfDay::Dawn => "Dawn",
        TimeOfDay::Day => "Day",
        TimeOfDay::Sunset => "Sunset",
        TimeOfDay::Dusk => "Dusk",
        TimeOfDay::Night => "Night",
    }
}

fn temperature_label(state: &AppState) -> String {
    state
        .weather
        .temperature_f
        .map(|t| format!("{t}°F"))
        .unwrap_or_else(|| "--°F".to_string())
}

fn precipitation_label(precipitation: Precipitation) -> Option<String> {
    match precipitation {
        Precipitation::None => None,
        Precipitation::Rain { opacity } => Some(format!("Rain    opacity {opacity:.2}")),
        Precipitation::Snow { opacity } => Some(format!("Snow    opacity {opacity:.2}")),
    }
}

/// Multi-line description of one frame.
pub fn frame_report(frame: &SkyFrame, state: &AppState) -> String {
    let [top, middle, bottom] = frame.sky_gradient.0;
    let mut lines = vec![
        format!("📍 {}", state.location_label()),
        format!("{}  {}", frame.time_label, frame.date_label),
        format!(
            "{} · {} · {}",
            time_of_day_label(frame.time_of_day),
            frame.condition,
            temperature_label(state)
        ),
        format!("Sky     {top} → {middle} → {bottom}"),
    ];

    if frame.is_day {
        lines.push(format!(
            "Sun     at ({:.0}, {:.0}) opacity {:.2}",
            frame.sun.x, frame.sun.y, frame.sun_opacity
        ));
    } else {
        lines.push(format!(
            "Moon    at ({:.0}, {:.0}) opacity {:.2}",
            frame.moon.x, frame.moon.y, frame.moon_opacity
        ));
        lines.push(format!("Stars   opacity {:.2}", frame.star_opacity));
    }

    let [near, far] = frame.cloud_durations;
    lines.push(format!(
        "Clouds  opacity {:.2}, drifting {near:.0}s / {far:.0}s",
        frame.cloud_opacity
    ));
    lines.extend(precipitation_label(frame.precipitation));
    lines.extend(frame.wind_label.clone());

    lines.join("\n")
}

/// One line per tick for `watch`.
pub fn status_line(frame: &SkyFrame, state: &AppState) -> String {
    let mut line = format!(
        "{} | {} | {} {} {}",
        frame.time_label,
        state.location_label(),
        time_of_day_label(frame.time_of_day),
        frame.condition,
        temperature_label(state),
    );
    if let Some(wind) = &frame.wind_label {
        line.push_str(" | ");
        line.push_str(wind);
    }
    line
}

/// Numbered suggestion list: name, then admin1/country details.
pub fn suggestion_list(suggestions: &[CandidateLocation]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name = s.name.as_deref().unwrap_or_default();
            format!("  #{} {name}  ({})", i + 1, s.details())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
