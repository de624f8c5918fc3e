//! Time and weather to sky appearance.
//!
//! Everything here is a pure function of the local clock, the weather
//! condition and the viewport, except the per-star jitter which is rolled
//! once when a [`Starfield`] is created.

use chrono::{DateTime, Local, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;

use crate::{
    model::{Condition, WINDY_THRESHOLD_MPH, WeatherState},
    state::AppState,
};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Vertical distance from the bottom of the viewport to the arc's centre.
const ARC_BASELINE_OFFSET: f64 = 190.0;
const ARC_RADIUS_FACTOR: f64 = 1.2;
const SUN_HALF_SIZE: f64 = 40.0;
const MOON_HALF_SIZE: f64 = 35.0;

/// Base animation durations, in seconds, of the two cloud layers.
pub const CLOUD_BASE_DURATIONS: [f64; 2] = [60.0, 80.0];

pub const DEFAULT_STAR_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Sunset,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6 => Self::Dawn,
            7..=16 => Self::Day,
            17 => Self::Sunset,
            19 | 20 => Self::Dusk,
            _ => Self::Night,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Dawn => 0,
            Self::Day => 1,
            Self::Sunset => 2,
            Self::Dusk => 3,
            Self::Night => 4,
        }
    }
}

/// Daytime is 06:00 up to, not including, 18:00.
pub fn is_day(hour: u32) -> bool {
    (6..18).contains(&hour)
}

/// Wall clock at the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalClock {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// `HH:MM:SS`, 24 hour.
    pub time_label: String,
    /// `Friday, October 16, 2026`
    pub date_label: String,
}

impl LocalClock {
    /// Local time in `timezone`, or in the system timezone when none is
    /// known or the identifier is not recognised.
    pub fn at(now: DateTime<Utc>, timezone: Option<&str>) -> Self {
        let local = local_datetime(now, timezone);
        Self {
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            time_label: local.format("%H:%M:%S").to_string(),
            date_label: local.format("%A, %B %-d, %Y").to_string(),
        }
    }

    /// Seconds since local midnight over 86400, in `[0, 1)`.
    pub fn day_fraction(&self) -> f64 {
        day_fraction(self.hour, self.minute, self.second)
    }
}

fn local_datetime(now: DateTime<Utc>, timezone: Option<&str>) -> NaiveDateTime {
    match timezone.map(|tz| (tz, tz.parse::<Tz>())) {
        Some((_, Ok(tz))) => now.with_timezone(&tz).naive_local(),
        Some((name, Err(_))) => {
            tracing::debug!(timezone = name, "Unknown timezone, using system time");
            now.with_timezone(&Local).naive_local()
        }
        None => now.with_timezone(&Local).naive_local(),
    }
}

pub fn day_fraction(hour: u32, minute: u32, second: u32) -> f64 {
    f64::from(hour * 3600 + minute * 60 + second) / SECONDS_PER_DAY
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of a body, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Celestial {
    pub sun: Point,
    pub moon: Point,
}

/// Sun and moon on one circle whose centre sits below the viewport. The sun
/// enters on the left and tops out mid-day; the moon runs the mirrored arc.
pub fn celestial_positions(day_fraction: f64, viewport: Viewport) -> Celestial {
    let angle = PI * day_fraction;
    let center_x = viewport.width / 2.0;
    let center_y = viewport.height + ARC_BASELINE_OFFSET;
    let radius = viewport.height * ARC_RADIUS_FACTOR;

    let sun = Point {
        x: center_x + radius * (PI - angle).cos() - SUN_HALF_SIZE,
        y: center_y - radius * (PI - angle).sin() - SUN_HALF_SIZE,
    };
    let moon = Point {
        x: center_x + radius * (-angle).cos() - MOON_HALF_SIZE,
        y: center_y - radius * (-angle).sin() - MOON_HALF_SIZE,
    };

    Celestial { sun, moon }
}

/// Three-stop top-to-bottom gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gradient(pub [&'static str; 3]);

impl Gradient {
    pub fn to_css(&self) -> String {
        let [top, middle, bottom] = self.0;
        format!("linear-gradient(to bottom, {top}, {middle}, {bottom})")
    }
}

/// Rows are dawn, day, sunset, dusk, night.
type GradientRow = [[&'static str; 3]; 5];

static SKY_GRADIENTS: &[(Condition, GradientRow)] = &[
    (
        Condition::Clear,
        [
            ["#FF6B6B", "#FFD93D", "#6BCB77"],
            ["#87CEEB", "#87CEEB", "#B0E0E6"],
            ["#FF6B6B", "#FF8E53", "#FE6B8B"],
            ["#2C3E50", "#34495E", "#5D6D7E"],
            ["#0B1026", "#1A1A2E", "#16213E"],
        ],
    ),
    (
        Condition::PartlyCloudy,
        [
            ["#FF8E7A", "#FFC777", "#7AB88F"],
            ["#9DB4C0", "#B8D4E0", "#C9DDE6"],
            ["#E07A7A", "#E0A080", "#E08BA0"],
            ["#3D4E5E", "#475968", "#667888"],
            ["#1A2436", "#2A2A3E", "#26314E"],
        ],
    ),
    (
        Condition::Cloudy,
        [
            ["#8B9AA3", "#A0AFB8", "#B5C4CD"],
            ["#A8B8C0", "#BCC9D1", "#D0DDE5"],
            ["#9A8A8A", "#AA9A9A", "#BAAAAA"],
            ["#4D5D6D", "#5D6D7D", "#6D7D8D"],
            ["#2A3444", "#3A3A4E", "#3A4458"],
        ],
    ),
    (
        Condition::Drizzle,
        [
            ["#7D8D9D", "#8D9DAD", "#9DADBD"],
            ["#8899AA", "#99AABB", "#AABBCC"],
            ["#8A7A8A", "#9A8A9A", "#AA9AAA"],
            ["#4D5D6D", "#5D6D7D", "#6D7D8D"],
            ["#2A3A4A", "#3A4A5A", "#3A4A6A"],
        ],
    ),
    (
        Condition::Rainy,
        [
            ["#6D7D8D", "#7D8D9D", "#8D9DAD"],
            ["#778899", "#8899AA", "#99AABB"],
            ["#7A6A7A", "#8A7A8A", "#9A8A9A"],
            ["#3D4D5D", "#4D5D6D", "#5D6D7D"],
            ["#1A2A3A", "#2A3A4A", "#2A3A5A"],
        ],
    ),
    (
        Condition::Stormy,
        [
            ["#4A5A6A", "#5A6A7A", "#6A7A8A"],
            ["#556677", "#667788", "#778899"],
            ["#5A4A5A", "#6A5A6A", "#7A6A7A"],
            ["#2D3D4D", "#3D4D5D", "#4D5D6D"],
            ["#0A1A2A", "#1A2A3A", "#1A2A4A"],
        ],
    ),
    (
        Condition::Snowy,
        [
            ["#D0D8E0", "#E0E8F0", "#F0F8FF"],
            ["#E8F0F8", "#F0F8FF", "#F8FFFF"],
            ["#D8C8D8", "#E8D8E8", "#F8E8F8"],
            ["#A8B8C8", "#B8C8D8", "#C8D8E8"],
            ["#3A4A5A", "#4A5A6A", "#5A6A7A"],
        ],
    ),
    (
        Condition::Foggy,
        [
            ["#B8C0C8", "#C8D0D8", "#D8E0E8"],
            ["#C8D0D8", "#D8E0E8", "#E8F0F8"],
            ["#C0B0C0", "#D0C0D0", "#E0D0E0"],
            ["#889098", "#98A0A8", "#A8B0B8"],
            ["#3A4248", "#4A5258", "#5A6268"],
        ],
    ),
];

static SUN_OPACITY: &[(Condition, f64)] = &[
    (Condition::Clear, 1.0),
    (Condition::PartlyCloudy, 0.8),
    (Condition::Cloudy, 0.3),
    (Condition::Drizzle, 0.25),
    (Condition::Rainy, 0.2),
    (Condition::Stormy, 0.1),
    (Condition::Snowy, 0.4),
    (Condition::Foggy, 0.3),
];

static MOON_OPACITY: &[(Condition, f64)] = &[
    (Condition::Clear, 1.0),
    (Condition::PartlyCloudy, 0.7),
    (Condition::Cloudy, 0.3),
    (Condition::Drizzle, 0.25),
    (Condition::Rainy, 0.2),
    (Condition::Stormy, 0.1),
    (Condition::Snowy, 0.5),
    (Condition::Foggy, 0.2),
];

static CLOUD_MULTIPLIER: &[(Condition, f64)] = &[
    (Condition::Clear, 0.5),
    (Condition::PartlyCloudy, 1.0),
    (Condition::Cloudy, 1.5),
    (Condition::Drizzle, 1.6),
    (Condition::Rainy, 1.8),
    (Condition::Stormy, 2.0),
    (Condition::Snowy, 1.3),
    (Condition::Foggy, 1.6),
];

/// Gradient for a time bucket and condition. A condition without a row
/// uses the clear-sky row.
pub fn sky_gradient(time_of_day: TimeOfDay, condition: Condition) -> Gradient {
    let row = gradient_row(SKY_GRADIENTS, condition)
        .or_else(|| gradient_row(SKY_GRADIENTS, Condition::Clear))
        .unwrap_or(&SKY_GRADIENTS[0].1);
    Gradient(row[time_of_day.index()])
}

fn gradient_row(
    table: &'static [(Condition, GradientRow)],
    condition: Condition,
) -> Option<&'static GradientRow> {
    table
        .iter()
        .find(|(c, _)| *c == condition)
        .map(|(_, row)| row)
}

/// Table value for `condition`, or 1 when the table has no entry.
fn multiplier(table: &[(Condition, f64)], condition: Condition) -> f64 {
    table
        .iter()
        .find(|(c, _)| *c == condition)
        .map(|(_, value)| *value)
        .unwrap_or(1.0)
}

pub fn sun_opacity(condition: Condition) -> f64 {
    multiplier(SUN_OPACITY, condition)
}

pub fn moon_opacity(condition: Condition) -> f64 {
    multiplier(MOON_OPACITY, condition)
}

pub fn cloud_opacity(condition: Condition, is_day: bool) -> f64 {
    let base = if is_day { 0.7 } else { 0.2 };
    (base * multiplier(CLOUD_MULTIPLIER, condition)).min(1.0)
}

/// Base star opacity before per-star jitter.
pub fn star_opacity(condition: Condition, is_day: bool) -> f64 {
    match (is_day, condition) {
        (true, _) => 0.0,
        (false, Condition::Clear) => 1.0,
        (false, _) => 0.3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Precipitation {
    None,
    Rain { opacity: f64 },
    Snow { opacity: f64 },
}

pub fn precipitation(condition: Condition) -> Precipitation {
    match condition {
        Condition::Drizzle => Precipitation::Rain { opacity: 0.3 },
        Condition::Rainy | Condition::Stormy => Precipitation::Rain { opacity: 0.6 },
        Condition::Snowy => Precipitation::Snow { opacity: 0.8 },
        _ => Precipitation::None,
    }
}

/// Clouds speed up once wind passes the windy threshold.
pub fn cloud_duration(base_secs: f64, wind_speed_mph: i32) -> f64 {
    let multiplier = (f64::from(wind_speed_mph) / f64::from(WINDY_THRESHOLD_MPH)).max(1.0);
    base_secs / multiplier
}

pub fn wind_label(weather: &WeatherState) -> Option<String> {
    weather
        .is_windy
        .then(|| format!("Wind: {} mph", weather.wind_speed_mph))
}

/// One star with its fixed twinkle factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Star {
    /// Percent of viewport width, `[0, 100)`.
    pub x: f64,
    /// Percent of viewport height, `[0, 70)`.
    pub y: f64,
    /// Fixed at creation, `[0.5, 1.0]`.
    pub jitter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                x: rng.gen_range(0.0..100.0),
                y: rng.gen_range(0.0..70.0),
                jitter: rng.gen_range(0.5..=1.0),
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn opacities(&self, base: f64) -> Vec<f64> {
        self.stars.iter().map(|s| base * s.jitter).collect()
    }
}

/// Everything needed to draw one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyFrame {
    pub time_label: String,
    pub date_label: String,
    pub day_fraction: f64,
    pub time_of_day: TimeOfDay,
    pub is_day: bool,
    pub condition: Condition,
    pub sun: Point,
    pub moon: Point,
    pub sky_gradient: Gradient,
    pub sun_opacity: f64,
    pub moon_opacity: f64,
    pub cloud_opacity: f64,
    pub star_opacity: f64,
    pub precipitation: Precipitation,
    pub cloud_durations: [f64; 2],
    pub wind_label: Option<String>,
}

impl SkyFrame {
    pub fn compute(
        now: DateTime<Utc>,
        timezone: Option<&str>,
        weather: &WeatherState,
        viewport: Viewport,
    ) -> Self {
        let clock = LocalClock::at(now, timezone);
        let fraction = clock.day_fraction();
        let day = is_day(clock.hour);
        let time_of_day = TimeOfDay::from_hour(clock.hour);
        let condition = weather.condition;
        let Celestial { sun, moon } = celestial_positions(fraction, viewport);

        Self {
            time_label: clock.time_label,
            date_label: clock.date_label,
            day_fraction: fraction,
            time_of_day,
            is_day: day,
            condition,
            sun,
            moon,
            sky_gradient: sky_gradient(time_of_day, condition),
            sun_opacity: if day { sun_opacity(condition) } else { 0.0 },
            moon_opacity: if day { 0.0 } else { moon_opacity(condition) },
            cloud_opacity: cloud_opacity(condition, day),
            star_opacity: star_opacity(condition, day),
            precipitation: precipitation(condition),
            cloud_durations: CLOUD_BASE_DURATIONS
                .map(|base| cloud_duration(base, weather.wind_speed_mph)),
            wind_label: wind_label(weather),
        }
    }
}

/// Holds the per-session pieces (viewport, starfield) and turns state
/// snapshots into frames.
#[derive(Debug, Clone)]
pub struct SkyRenderer {
    viewport: Viewport,
    starfield: Starfield,
}

impl SkyRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_starfield(
            viewport,
            Starfield::generate(DEFAULT_STAR_COUNT, &mut rand::thread_rng()),
        )
    }

    pub fn with_starfield(viewport: Viewport, starfield: Starfield) -> Self {
        Self {
            viewport,
            starfield,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn frame(&self, now: DateTime<Utc>, state: &AppState) -> SkyFrame {
        SkyFrame::compute(now, state.timezone(), &state.weather, self.viewport)
    }

    pub fn star_opacities(&self, frame: &SkyFrame) -> Vec<f64> {
        self.starfield.opacities(frame.star_opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};

    const VIEW: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, m, s).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn day_is_six_to_eighteen() {
        let day_hours: Vec<u32> = (0..24).filter(|h| is_day(*h)).collect();
        assert_eq!(day_hours, (6..18).collect::<Vec<_>>());
    }

    #[test]
    fn time_buckets() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Sunset);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    }

    #[test]
    fn day_fraction_bounds() {
        assert_eq!(day_fraction(0, 0, 0), 0.0);
        assert_eq!(day_fraction(12, 0, 0), 0.5);
        assert!(day_fraction(23, 59, 59) < 1.0);
    }

    #[test]
    fn clock_follows_timezone() {
        let now = utc(12, 30, 5);
        let tokyo = LocalClock::at(now, Some("Asia/Tokyo"));
        assert_eq!(tokyo.time_label, "21:30:05");
        assert_eq!(tokyo.date_label, "Friday, October 16, 2026");

        let utc_clock = LocalClock::at(now, Some("UTC"));
        assert_eq!((utc_clock.hour, utc_clock.minute, utc_clock.second), (12, 30, 5));

        let la = LocalClock::at(utc(3, 0, 0), Some("America/Los_Angeles"));
        assert_eq!(la.hour, 20);
        assert_eq!(la.date_label, "Thursday, October 15, 2026");
    }

    #[test]
    fn unknown_timezone_uses_system_time() {
        let now = utc(12, 0, 0);
        assert_eq!(
            LocalClock::at(now, Some("Mars/Olympus_Mons")),
            LocalClock::at(now, None)
        );
    }

    #[test]
    fn sun_peaks_at_noon_top_centre() {
        let noon = celestial_positions(0.5, VIEW);
        assert!(close(noon.sun.x, 500.0 - 40.0));
        assert!(close(noon.sun.y, 800.0 + 190.0 - 960.0 - 40.0));

        let midnight = celestial_positions(0.0, VIEW);
        assert!(close(midnight.sun.x, 500.0 - 960.0 - 40.0));
        assert!(close(midnight.moon.x, 500.0 + 960.0 - 35.0));
    }

    #[test]
    fn sun_moves_left_to_right() {
        let morning = celestial_positions(0.3, VIEW);
        let evening = celestial_positions(0.7, VIEW);
        assert!(morning.sun.x < evening.sun.x);
        assert!(close(morning.sun.y, evening.sun.y));
    }

    #[test]
    fn positions_are_deterministic() {
        for i in 0..100 {
            let fraction = f64::from(i) / 100.0;
            assert_eq!(
                celestial_positions(fraction, VIEW),
                celestial_positions(fraction, VIEW)
            );
        }
    }

    #[test]
    fn every_condition_has_gradients() {
        for condition in Condition::all() {
            for hour in 0..24 {
                let bucket = TimeOfDay::from_hour(hour);
                let gradient = sky_gradient(bucket, *condition);
                assert!(gradient.0.iter().all(|stop| stop.starts_with('#')));
            }
        }
        assert_eq!(
            sky_gradient(TimeOfDay::Day, Condition::Clear).to_css(),
            "linear-gradient(to bottom, #87CEEB, #87CEEB, #B0E0E6)"
        );
        assert_eq!(
            sky_gradient(TimeOfDay::Night, Condition::Stormy).0,
            ["#0A1A2A", "#1A2A3A", "#1A2A4A"]
        );
    }

    #[test]
    fn missing_entries_fall_back() {
        let partial: &[(Condition, f64)] = &[(Condition::Clear, 0.5)];
        assert_eq!(multiplier(partial, Condition::Snowy), 1.0);
        assert_eq!(multiplier(partial, Condition::Clear), 0.5);

        let partial_gradients: &'static [(Condition, GradientRow)] = &SKY_GRADIENTS[..1];
        assert!(gradient_row(partial_gradients, Condition::Foggy).is_none());
    }

    #[test]
    fn opacity_tables() {
        assert_eq!(sun_opacity(Condition::PartlyCloudy), 0.8);
        assert_eq!(moon_opacity(Condition::Snowy), 0.5);
        assert!(close(cloud_opacity(Condition::Clear, true), 0.35));
        assert_eq!(cloud_opacity(Condition::Stormy, true), 1.0);
        assert!(close(cloud_opacity(Condition::Rainy, false), 0.36));
    }

    #[test]
    fn stars_only_at_night() {
        assert_eq!(star_opacity(Condition::Clear, true), 0.0);
        assert_eq!(star_opacity(Condition::Clear, false), 1.0);
        assert_eq!(star_opacity(Condition::Cloudy, false), 0.3);
    }

    #[test]
    fn precipitation_by_condition() {
        assert_eq!(
            precipitation(Condition::Drizzle),
            Precipitation::Rain { opacity: 0.3 }
        );
        assert_eq!(
            precipitation(Condition::Stormy),
            Precipitation::Rain { opacity: 0.6 }
        );
        assert_eq!(
            precipitation(Condition::Snowy),
            Precipitation::Snow { opacity: 0.8 }
        );
        assert_eq!(precipitation(Condition::Foggy), Precipitation::None);
    }

    #[test]
    fn wind_speeds_up_clouds() {
        assert!(close(cloud_duration(60.0, 20), 60.0 * 0.75));
        assert!(close(cloud_duration(80.0, 20), 80.0 * 0.75));
        assert_eq!(cloud_duration(60.0, 10), 60.0);
        assert_eq!(cloud_duration(60.0, 0), 60.0);
    }

    #[test]
    fn starfield_jitter_is_fixed_per_star() {
        let field = Starfield::generate(50, &mut StdRng::seed_from_u64(7));
        assert_eq!(field.stars().len(), 50);
        assert!(field.stars().iter().all(|s| (0.5..=1.0).contains(&s.jitter)));
        assert!(field.stars().iter().all(|s| s.y < 70.0));
        assert_eq!(field.opacities(1.0), field.opacities(1.0));
        assert!(field.opacities(0.0).iter().all(|o| *o == 0.0));
    }

    #[test]
    fn night_frame_in_the_rain() {
        let weather = WeatherState::new(Condition::Rainy, 48, 20);
        let frame = SkyFrame::compute(utc(22, 15, 0), Some("UTC"), &weather, VIEW);

        assert!(!frame.is_day);
        assert_eq!(frame.time_of_day, TimeOfDay::Night);
        assert_eq!(frame.sun_opacity, 0.0);
        assert_eq!(frame.moon_opacity, 0.2);
        assert_eq!(frame.star_opacity, 0.3);
        assert_eq!(frame.precipitation, Precipitation::Rain { opacity: 0.6 });
        assert!(close(frame.cloud_durations[0], 45.0));
        assert!(close(frame.cloud_durations[1], 60.0));
        assert_eq!(frame.wind_label.as_deref(), Some("Wind: 20 mph"));
        assert_eq!(frame.time_label, "22:15:00");
    }

    #[test]
    fn clear_day_frame() {
        let frame = SkyFrame::compute(utc(9, 0, 0), Some("UTC"), &WeatherState::default(), VIEW);

        assert!(frame.is_day);
        assert_eq!(frame.time_of_day, TimeOfDay::Day);
        assert_eq!(frame.sun_opacity, 1.0);
        assert_eq!(frame.moon_opacity, 0.0);
        assert_eq!(frame.star_opacity, 0.0);
        assert_eq!(frame.precipitation, Precipitation::None);
        assert_eq!(frame.wind_label, None);
    }

    #[test]
    fn resize_moves_bodies_only() {
        let mut renderer = SkyRenderer::with_starfield(
            VIEW,
            Starfield::generate(10, &mut StdRng::seed_from_u64(1)),
        );
        let state = AppState::default();
        let before = renderer.frame(utc(9, 0, 0), &state);

        renderer.resize(Viewport::new(400.0, 300.0));
        assert_eq!(renderer.viewport(), Viewport::new(400.0, 300.0));

        let after = renderer.frame(utc(9, 0, 0), &state);
        assert_ne!(after.sun, before.sun);
        assert_eq!(after.sky_gradient, before.sky_gradient);
        assert_eq!(after.sun_opacity, before.sun_opacity);
    }

    #[test]
    fn renderer_reads_state_timezone() {
        let renderer = SkyRenderer::with_starfield(
            VIEW,
            Starfield::generate(10, &mut StdRng::seed_from_u64(1)),
        );
        let state = AppState {
            location: Some(crate::model::Location {
                coordinates: crate::model::Coordinates::new(35.68, 139.69),
                display_name: "Tokyo, Japan".into(),
                timezone: Some("Asia/Tokyo".into()),
            }),
            weather: WeatherState::default(),
        };

        let frame = renderer.frame(utc(12, 0, 0), &state);
        assert_eq!(frame.time_label, "21:00:00");
        assert!(renderer.star_opacities(&frame).iter().all(|o| *o >= 0.5));
    }
}
