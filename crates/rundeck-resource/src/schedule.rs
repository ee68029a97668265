//! Schedule expression parsing and formatting.

use rundeck_client::{JobSchedule, ScheduleMonth, ScheduleTime, ScheduleWeekDay, ScheduleYear};

use crate::error::ResourceError;

const FIELD_COUNT: usize = 7;

/// Split a `seconds minute hour day-of-month month day-of-week year` expression.
///
/// Fields are separated by single spaces and kept verbatim; the weekday is
/// always populated.
pub fn parse_schedule(expression: &str) -> Result<JobSchedule, ResourceError> {
    let fields: Vec<&str> = expression.split(' ').collect();
    let &[seconds, minute, hour, day, month, week_day, year] = fields.as_slice() else {
        return Err(ResourceError::InvalidSchedule {
            expression: expression.to_string(),
            fields: fields.len(),
        });
    };

    Ok(JobSchedule {
        time: ScheduleTime {
            seconds: seconds.to_string(),
            minute: minute.to_string(),
            hour: hour.to_string(),
        },
        month: ScheduleMonth {
            day: day.to_string(),
            month: month.to_string(),
        },
        week_day: Some(ScheduleWeekDay {
            day: week_day.to_string(),
        }),
        year: ScheduleYear {
            year: year.to_string(),
        },
    })
}

/// Join a schedule back into its 7-field form; a missing weekday becomes `*`.
pub fn format_schedule(schedule: &JobSchedule) -> String {
    let week_day = schedule
        .week_day
        .as_ref()
        .map(|w| w.day.as_str())
        .unwrap_or("*");

    let fields: [&str; FIELD_COUNT] = [
        &schedule.time.seconds,
        &schedule.time.minute,
        &schedule.time.hour,
        &schedule.month.day,
        &schedule.month.month,
        week_day,
        &schedule.year.year,
    ];
    fields.join(" ")
}
