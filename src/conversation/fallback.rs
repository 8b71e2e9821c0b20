//! Canned replies used when the chat model is unavailable

use chrono::{DateTime, Local};

pub const GREETING: &str = "Hello! How can I help you today?";

pub const SELF_INTRODUCTION: &str = "I'm JARVIS, your AI assistant. I can help you with various tasks and engage in natural conversations.";

pub const INTELLIGENCE_UNAVAILABLE: &str = "I'm having trouble connecting to my main intelligence system. I can still help with basic tasks like telling time or date.";

/// Reply to `prompt` using the current local clock
#[must_use]
pub fn default_reply(prompt: &str) -> String {
    default_reply_at(prompt, &Local::now())
}

/// Reply to `prompt` as if the time were `now`
#[must_use]
pub fn default_reply_at(prompt: &str, now: &DateTime<Local>) -> String {
    let prompt = prompt.to_lowercase();

    if prompt.contains("hello") || prompt.contains("hi") {
        GREETING.to_string()
    } else if prompt.contains("what time") {
        format!("The current time is {}", now.format("%-I:%M:%S %p"))
    } else if prompt.contains("what date") {
        format!("Today's date is {}", now.format("%-m/%-d/%Y"))
    } else if prompt.contains("who are you") {
        SELF_INTRODUCTION.to_string()
    } else {
        INTELLIGENCE_UNAVAILABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap()
    }

    #[test]
    fn greeting() {
        assert_eq!(default_reply("hello"), GREETING);
        assert_eq!(default_reply("Hi JARVIS"), GREETING);
    }

    #[test]
    fn time_and_date() {
        let now = fixed_now();
        assert_eq!(
            default_reply_at("what time is it", &now),
            "The current time is 3:04:05 PM"
        );
        assert_eq!(
            default_reply_at("what date is today", &now),
            "Today's date is 3/7/2024"
        );
    }

    #[test]
    fn identity() {
        assert_eq!(default_reply("who are you"), SELF_INTRODUCTION);
    }

    #[test]
    fn anything_else() {
        assert_eq!(default_reply("tell me a joke"), INTELLIGENCE_UNAVAILABLE);
        assert_eq!(default_reply(""), INTELLIGENCE_UNAVAILABLE);
    }

    #[test]
    fn greeting_outranks_time() {
        // "hi" is a substring test, so it wins over the later branches
        assert_eq!(default_reply("hi, what time is it"), GREETING);
    }

    #[test]
    fn idempotent_for_fixed_branches() {
        for prompt in ["hello", "who are you", "sing a song"] {
            assert_eq!(default_reply(prompt), default_reply(prompt));
        }
        let now = fixed_now();
        assert_eq!(
            default_reply_at("what time", &now),
            default_reply_at("what time", &now)
        );
    }
}
