//! Order window policy evaluation
//!
//! A [`OrderWindowPolicy`] describes when clients of a tenant may submit
//! orders. [`WindowEvaluator::evaluate`] turns a policy plus the tenant's
//! local wall-clock instant into a [`WindowEvaluation`]: whether ordering is
//! open and, when warnings are enabled, an [`Advisory`] describing how much
//! time is left.
//!
//! Evaluation is a pure function of its inputs. Advisory selection walks an
//! ordered threshold table per policy type; the first matching row wins.
//!
//! ```text
//! daily    closed → critical │ ≤2h → critical │ ≤6h → warning │ ≤12h → info
//! weekly   closed → critical │ 0d & ≤2h → critical │ 0d → warning │ 1d → info │ 2..=3d → info
//! monthly  closed → critical │ 0d & ≤2h → critical │ 0d → warning │ 1d → info │ 2..=7d → info
//! ```

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Day of the week used by weekly schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Position in the week, Monday = 0
    pub fn index(self) -> i64 {
        match self {
            DayOfWeek::Monday => 0,
            DayOfWeek::Tuesday => 1,
            DayOfWeek::Wednesday => 2,
            DayOfWeek::Thursday => 3,
            DayOfWeek::Friday => 4,
            DayOfWeek::Saturday => 5,
            DayOfWeek::Sunday => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Daily schedule: hours remaining in the current cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct DailySettings {
    #[validate(range(max = 24))]
    pub daily_hours: u32,
}

impl Default for DailySettings {
    fn default() -> Self {
        Self { daily_hours: 24 }
    }
}

/// Weekly schedule: open from `start_day` until `end_day` at `end_hour:end_minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct WeeklySettings {
    pub start_day: DayOfWeek,
    pub end_day: DayOfWeek,
    #[validate(range(max = 23))]
    pub end_hour: u32,
    #[validate(range(max = 59))]
    pub end_minute: u32,
}

impl Default for WeeklySettings {
    fn default() -> Self {
        Self {
            start_day: DayOfWeek::Monday,
            end_day: DayOfWeek::Sunday,
            end_hour: 23,
            end_minute: 59,
        }
    }
}

/// Monthly schedule: open until day `end_day` at `end_hour:end_minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthlySettings {
    #[validate(range(min = 1, max = 31))]
    pub end_day: u32,
    #[validate(range(max = 23))]
    pub end_hour: u32,
    #[validate(range(max = 59))]
    pub end_minute: u32,
}

impl Default for MonthlySettings {
    fn default() -> Self {
        Self {
            end_day: 31,
            end_hour: 23,
            end_minute: 59,
        }
    }
}

/// Administrator-defined ordering schedule
///
/// The adjacent `type`/`settings` encoding keeps the settings shape tied to
/// the policy type: a weekly policy cannot carry monthly settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "lowercase")]
pub enum OrderWindowPolicy {
    Daily(DailySettings),
    Weekly(WeeklySettings),
    Monthly(MonthlySettings),
}

/// Rejected policy configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{policy} policy has invalid settings: {message}")]
    InvalidSettings {
        policy: &'static str,
        message: String,
    },
}

impl OrderWindowPolicy {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderWindowPolicy::Daily(_) => "daily",
            OrderWindowPolicy::Weekly(_) => "weekly",
            OrderWindowPolicy::Monthly(_) => "monthly",
        }
    }

    /// Check settings ranges (hours, minutes, day of month)
    pub fn validate(&self) -> Result<(), PolicyError> {
        let result = match self {
            OrderWindowPolicy::Daily(s) => s.validate(),
            OrderWindowPolicy::Weekly(s) => s.validate(),
            OrderWindowPolicy::Monthly(s) => s.validate(),
        };

        result.map_err(|errors| PolicyError::InvalidSettings {
            policy: self.kind(),
            message: errors.to_string(),
        })
    }
}

/// What to do when a monthly `end_day` does not exist in the current month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOverflow {
    /// Close on the last day of the month instead
    #[default]
    Clamp,
    /// Keep the window closed for the whole month
    Reject,
}

/// Urgency of an advisory message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLevel {
    Info,
    Warning,
    Critical,
}

/// Human-readable, non-gating time-remaining message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub message: String,
    pub level: AdvisoryLevel,
}

/// Result of evaluating a window policy at an instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEvaluation {
    pub open: bool,
    pub advisory: Option<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_remaining_today: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<NaiveDateTime>,
}

impl WindowEvaluation {
    /// Open window with nothing to report
    pub fn ungated() -> Self {
        Self {
            open: true,
            advisory: None,
            hours_remaining: None,
            days_remaining: None,
            minutes_remaining_today: None,
            closes_at: None,
        }
    }

    pub fn advisory_message(&self) -> Option<&str> {
        self.advisory.as_ref().map(|a| a.message.as_str())
    }
}

/// Tera templates for every advisory row
///
/// Templates see `hours`, `minutes`, `days`, `end_time` and `end_day`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryTemplates {
    pub closed: String,
    pub daily_critical: String,
    pub daily_warning: String,
    pub daily_info: String,
    pub closes_soon: String,
    pub closes_today: String,
    pub closes_tomorrow: String,
    pub closes_in_days: String,
}

impl Default for AdvisoryTemplates {
    fn default() -> Self {
        Self {
            closed: "Ordering is currently closed.".to_string(),
            daily_critical: "Only {{ hours }} hour(s) left to place your order!".to_string(),
            daily_warning: "{{ hours }} hours left to place your order.".to_string(),
            daily_info: "Orders close in {{ hours }} hours.".to_string(),
            closes_soon:
                "Hurry! Orders close today at {{ end_time }} ({{ hours }}h {{ minutes }}m left)."
                    .to_string(),
            closes_today: "Orders close today at {{ end_time }}.".to_string(),
            closes_tomorrow: "Orders close tomorrow at {{ end_time }}.".to_string(),
            closes_in_days: "Orders close in {{ days }} days ({{ end_day }} at {{ end_time }})."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TemplateKey {
    Closed,
    DailyCritical,
    DailyWarning,
    DailyInfo,
    ClosesSoon,
    ClosesToday,
    ClosesTomorrow,
    ClosesInDays,
}

impl TemplateKey {
    const ALL: [TemplateKey; 8] = [
        TemplateKey::Closed,
        TemplateKey::DailyCritical,
        TemplateKey::DailyWarning,
        TemplateKey::DailyInfo,
        TemplateKey::ClosesSoon,
        TemplateKey::ClosesToday,
        TemplateKey::ClosesTomorrow,
        TemplateKey::ClosesInDays,
    ];

    fn name(self) -> &'static str {
        match self {
            TemplateKey::Closed => "closed",
            TemplateKey::DailyCritical => "daily_critical",
            TemplateKey::DailyWarning => "daily_warning",
            TemplateKey::DailyInfo => "daily_info",
            TemplateKey::ClosesSoon => "closes_soon",
            TemplateKey::ClosesToday => "closes_today",
            TemplateKey::ClosesTomorrow => "closes_tomorrow",
            TemplateKey::ClosesInDays => "closes_in_days",
        }
    }
}

/// An advisory template that does not render
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("advisory template '{name}' does not render: {message}")]
pub struct TemplateError {
    pub name: &'static str,
    pub template: String,
    pub message: String,
}

impl AdvisoryTemplates {
    /// Render every template once against sample values
    pub fn validate(&self) -> Result<(), TemplateError> {
        let sample = Remaining {
            open: true,
            hours: 5,
            days: 2,
            minutes_today: 90,
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            end_day: "Friday".to_string(),
        };
        let context = template_context(&sample);

        for key in TemplateKey::ALL {
            let template = self.get(key);
            if let Err(e) = tera::Tera::one_off(template, &context, false) {
                return Err(TemplateError {
                    name: key.name(),
                    template: template.to_string(),
                    message: render_error_message(&e),
                });
            }
        }
        Ok(())
    }

    fn get(&self, key: TemplateKey) -> &str {
        match key {
            TemplateKey::Closed => &self.closed,
            TemplateKey::DailyCritical => &self.daily_critical,
            TemplateKey::DailyWarning => &self.daily_warning,
            TemplateKey::DailyInfo => &self.daily_info,
            TemplateKey::ClosesSoon => &self.closes_soon,
            TemplateKey::ClosesToday => &self.closes_today,
            TemplateKey::ClosesTomorrow => &self.closes_tomorrow,
            TemplateKey::ClosesInDays => &self.closes_in_days,
        }
    }
}

/// Time left in the current cycle, as seen by the threshold predicates
#[derive(Debug, Clone)]
struct Remaining {
    open: bool,
    hours: i64,
    days: i64,
    minutes_today: i64,
    end_time: Option<NaiveTime>,
    end_day: String,
}

struct ThresholdRow {
    matches: fn(&Remaining) -> bool,
    level: AdvisoryLevel,
    template: TemplateKey,
}

const CRITICAL_MINUTES: i64 = 2 * 60;

fn is_closed(r: &Remaining) -> bool {
    !r.open
}

fn hours_at_most_2(r: &Remaining) -> bool {
    r.hours <= 2
}

fn hours_at_most_6(r: &Remaining) -> bool {
    r.hours <= 6
}

fn hours_at_most_12(r: &Remaining) -> bool {
    r.hours <= 12
}

fn last_day_final_hours(r: &Remaining) -> bool {
    r.days == 0 && r.minutes_today <= CRITICAL_MINUTES
}

fn last_day(r: &Remaining) -> bool {
    r.days == 0
}

fn one_day(r: &Remaining) -> bool {
    r.days == 1
}

fn two_to_three_days(r: &Remaining) -> bool {
    (2..=3).contains(&r.days)
}

fn two_to_seven_days(r: &Remaining) -> bool {
    (2..=7).contains(&r.days)
}

const DAILY_THRESHOLDS: &[ThresholdRow] = &[
    ThresholdRow {
        matches: is_closed,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::Closed,
    },
    ThresholdRow {
        matches: hours_at_most_2,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::DailyCritical,
    },
    ThresholdRow {
        matches: hours_at_most_6,
        level: AdvisoryLevel::Warning,
        template: TemplateKey::DailyWarning,
    },
    ThresholdRow {
        matches: hours_at_most_12,
        level: AdvisoryLevel::Info,
        template: TemplateKey::DailyInfo,
    },
];

const WEEKLY_THRESHOLDS: &[ThresholdRow] = &[
    ThresholdRow {
        matches: is_closed,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::Closed,
    },
    ThresholdRow {
        matches: last_day_final_hours,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::ClosesSoon,
    },
    ThresholdRow {
        matches: last_day,
        level: AdvisoryLevel::Warning,
        template: TemplateKey::ClosesToday,
    },
    ThresholdRow {
        matches: one_day,
        level: AdvisoryLevel::Info,
        template: TemplateKey::ClosesTomorrow,
    },
    ThresholdRow {
        matches: two_to_three_days,
        level: AdvisoryLevel::Info,
        template: TemplateKey::ClosesInDays,
    },
];

const MONTHLY_THRESHOLDS: &[ThresholdRow] = &[
    ThresholdRow {
        matches: is_closed,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::Closed,
    },
    ThresholdRow {
        matches: last_day_final_hours,
        level: AdvisoryLevel::Critical,
        template: TemplateKey::ClosesSoon,
    },
    ThresholdRow {
        matches: last_day,
        level: AdvisoryLevel::Warning,
        template: TemplateKey::ClosesToday,
    },
    ThresholdRow {
        matches: one_day,
        level: AdvisoryLevel::Info,
        template: TemplateKey::ClosesTomorrow,
    },
    ThresholdRow {
        matches: two_to_seven_days,
        level: AdvisoryLevel::Info,
        template: TemplateKey::ClosesInDays,
    },
];

/// Evaluates window policies against an instant
#[derive(Debug, Clone, Default)]
pub struct WindowEvaluator {
    templates: AdvisoryTemplates,
    month_overflow: MonthOverflow,
}

impl WindowEvaluator {
    pub fn new(templates: AdvisoryTemplates, month_overflow: MonthOverflow) -> Self {
        Self {
            templates,
            month_overflow,
        }
    }

    /// Evaluate `policy` at the tenant-local instant `now`
    ///
    /// With time control disabled, or no policy configured, ordering is
    /// always open and no advisory is produced. With warnings disabled the
    /// open flag is still computed but the advisory is always `None`.
    pub fn evaluate(
        &self,
        policy: Option<&OrderWindowPolicy>,
        warning_enabled: bool,
        time_control_enabled: bool,
        now: NaiveDateTime,
    ) -> WindowEvaluation {
        if !time_control_enabled {
            return WindowEvaluation::ungated();
        }
        let Some(policy) = policy else {
            return WindowEvaluation::ungated();
        };

        let (remaining, thresholds, mut evaluation) = match policy {
            OrderWindowPolicy::Daily(settings) => {
                let (remaining, evaluation) = daily(settings);
                (remaining, DAILY_THRESHOLDS, evaluation)
            }
            OrderWindowPolicy::Weekly(settings) => {
                let (remaining, evaluation) = weekly(settings, now);
                (remaining, WEEKLY_THRESHOLDS, evaluation)
            }
            OrderWindowPolicy::Monthly(settings) => {
                let (remaining, evaluation) = monthly(settings, now, self.month_overflow);
                (remaining, MONTHLY_THRESHOLDS, evaluation)
            }
        };

        if warning_enabled {
            evaluation.advisory = thresholds
                .iter()
                .find(|row| (row.matches)(&remaining))
                .map(|row| Advisory {
                    message: self.render(row.template, &remaining),
                    level: row.level,
                });
        }

        evaluation
    }

    fn render(&self, key: TemplateKey, remaining: &Remaining) -> String {
        let template = self.templates.get(key);
        let context = template_context(remaining);

        match tera::Tera::one_off(template, &context, false) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, template = %template, "Failed to render advisory template");
                template.to_string()
            }
        }
    }
}

fn template_context(remaining: &Remaining) -> tera::Context {
    let minutes_today = remaining.minutes_today.max(0);

    let mut context = tera::Context::new();
    if remaining.end_time.is_some() {
        context.insert("hours", &(minutes_today / 60));
    } else {
        context.insert("hours", &remaining.hours);
    }
    context.insert("minutes", &(minutes_today % 60));
    context.insert("days", &remaining.days);
    context.insert(
        "end_time",
        &remaining
            .end_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default(),
    );
    context.insert("end_day", &remaining.end_day);
    context
}

/// Tera wraps the useful cause; include the whole chain
fn render_error_message(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Evaluate with the default templates and month handling
pub fn evaluate(
    policy: Option<&OrderWindowPolicy>,
    warning_enabled: bool,
    time_control_enabled: bool,
    now: NaiveDateTime,
) -> WindowEvaluation {
    WindowEvaluator::default().evaluate(policy, warning_enabled, time_control_enabled, now)
}

fn end_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or_default()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

fn daily(settings: &DailySettings) -> (Remaining, WindowEvaluation) {
    let hours = i64::from(settings.daily_hours);
    let open = hours > 0;

    let remaining = Remaining {
        open,
        hours,
        days: 0,
        minutes_today: hours * 60,
        end_time: None,
        end_day: String::new(),
    };

    let evaluation = WindowEvaluation {
        open,
        hours_remaining: Some(hours),
        ..WindowEvaluation::ungated()
    };

    (remaining, evaluation)
}

fn weekly(settings: &WeeklySettings, now: NaiveDateTime) -> (Remaining, WindowEvaluation) {
    let current = DayOfWeek::from(now.weekday()).index();
    let start = settings.start_day.index();
    let end = settings.end_day.index();

    let days = if current <= end {
        end - current
    } else {
        7 - current + end
    };

    let close_time = end_time(settings.end_hour, settings.end_minute);
    let closes_at = (now.date() + Duration::days(days)).and_time(close_time);
    let minutes_today = (close_time - now.time()).num_minutes();

    let in_range = (current - start).rem_euclid(7) <= (end - start).rem_euclid(7);
    let open = in_range && now < closes_at;

    let remaining = Remaining {
        open,
        hours: minutes_today / 60,
        days,
        minutes_today,
        end_time: Some(close_time),
        end_day: settings.end_day.label().to_string(),
    };

    let evaluation = WindowEvaluation {
        open,
        days_remaining: Some(days),
        minutes_remaining_today: Some(minutes_today),
        closes_at: Some(closes_at),
        ..WindowEvaluation::ungated()
    };

    (remaining, evaluation)
}

fn monthly(
    settings: &MonthlySettings,
    now: NaiveDateTime,
    overflow: MonthOverflow,
) -> (Remaining, WindowEvaluation) {
    let month_length = days_in_month(now.year(), now.month());
    let close_time = end_time(settings.end_hour, settings.end_minute);
    let minutes_today = (close_time - now.time()).num_minutes();

    let end_day = match overflow {
        MonthOverflow::Clamp => Some(settings.end_day.min(month_length)),
        MonthOverflow::Reject if settings.end_day > month_length => None,
        MonthOverflow::Reject => Some(settings.end_day),
    };

    let Some(end_day) = end_day else {
        let remaining = Remaining {
            open: false,
            hours: 0,
            days: -1,
            minutes_today,
            end_time: Some(close_time),
            end_day: format!("day {}", settings.end_day),
        };
        let evaluation = WindowEvaluation {
            open: false,
            ..WindowEvaluation::ungated()
        };
        return (remaining, evaluation);
    };

    let days = i64::from(end_day) - i64::from(now.day());
    let closes_at = (days >= 0).then(|| (now.date() + Duration::days(days)).and_time(close_time));
    let open = closes_at.is_some_and(|close| now < close);

    let remaining = Remaining {
        open,
        hours: minutes_today / 60,
        days,
        minutes_today,
        end_time: Some(close_time),
        end_day: format!("day {}", end_day),
    };

    let evaluation = WindowEvaluation {
        open,
        days_remaining: Some(days),
        minutes_remaining_today: Some(minutes_today),
        closes_at,
        ..WindowEvaluation::ungated()
    };

    (remaining, evaluation)
}
