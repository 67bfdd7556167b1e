use chrono::{NaiveTime, Timelike};

/// Elapsed sleep minutes between two wall-clock times. There is no date
/// context, so a wake time at or before bedtime is assumed to be the next
/// day. Equal times mean a full 24h cycle, never zero.
pub fn duration_minutes(bedtime: NaiveTime, wake_time: NaiveTime) -> i32 {
    let bed = (bedtime.hour() * 60 + bedtime.minute()) as i32;
    let mut wake = (wake_time.hour() * 60 + wake_time.minute()) as i32;
    if wake <= bed {
        wake += 24 * 60;
    }
    wake - bed
}

/// "7hr 30min" display form used in log responses.
pub fn format_duration(minutes: i32) -> String {
    format!("{}hr {}min", minutes / 60, minutes % 60)
}
