#![forbid(unsafe_code)]

use chrono::{Local, Timelike};
use rand::seq::SliceRandom;
use rand::Rng;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const GREETING_LATE_NIGHT : &str = "🌙 夜深了，注意休息哦";
const GREETING_MORNING    : &str = "🌅 早上好！新的一天开始了";
const GREETING_AFTERNOON  : &str = "☀️ 下午好！适度使用手机";
const GREETING_EVENING    : &str = "🌆 晚上好！放松一下吧";

const TIME_PREFIX         : &str = "当前时间: ";

// Reminders appended as the last line, one drawn uniformly per call.
pub const TIPS: [&str; 5] = [
    "记得保护眼睛👀",
    "适当休息很重要💪",
    "保持良好作息😊",
    "多喝水有益健康💧",
    "户外活动更健康🌿",
];

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// dynamic_text:
// ---------------------------------------------------------------------------
/** Generate the overlay text from the local wall clock and a fresh tip draw. */
pub fn dynamic_text() -> String {
    compose_text(&Local::now(), &mut rand::thread_rng())
}

// ---------------------------------------------------------------------------
// compose_text:
// ---------------------------------------------------------------------------
/** Build the three line overlay text: greeting, current time, tip. */
pub fn compose_text<T, R>(now: &T, rng: &mut R) -> String
where
    T: Timelike,
    R: Rng + ?Sized,
{
    let greeting = greeting_for_hour(now.hour());
    let time_line = format!("{}{:02}:{:02}:{:02}",
                            TIME_PREFIX, now.hour(), now.minute(), now.second());
    let tip = TIPS.choose(rng).copied().unwrap_or(TIPS[0]);

    format!("{}\n{}\n{}", greeting, time_line, tip)
}

// ---------------------------------------------------------------------------
// greeting_for_hour:
// ---------------------------------------------------------------------------
/** Buckets are checked in order and the first match wins, so 6, 12 and 18
 * each open the following bucket.
 */
pub fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 6 {
        GREETING_LATE_NIGHT
    } else if hour < 12 {
        GREETING_MORNING
    } else if hour < 18 {
        GREETING_AFTERNOON
    } else {
        GREETING_EVENING
    }
}
