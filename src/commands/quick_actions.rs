use chrono::{DateTime, Local};

/// Weather lookups are not wired up, so say so instead of guessing
pub fn weather(_now: &DateTime<Local>) -> String {
    "현재 날씨 정보는 제공되지 않습니다. 다른 질문을 해주세요.".to_string()
}

/// Current wall-clock time, 24h with seconds
pub fn current_time(now: &DateTime<Local>) -> String {
    format!("현재 시간은 {}입니다.", now.format("%H:%M:%S"))
}

/// Today's date in ISO form
pub fn current_date(now: &DateTime<Local>) -> String {
    format!("오늘은 {}입니다.", now.format("%Y-%m-%d"))
}

pub fn news(_now: &DateTime<Local>) -> String {
    "현재 뉴스 정보를 제공하지 않습니다. 다른 질문을 해주세요.".to_string()
}

pub fn calculation(_now: &DateTime<Local>) -> String {
    "간단한 계산을 도와드릴 수 있습니다. 계산할 내용을 말씀해 주세요.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap()
    }

    #[test]
    fn test_current_time_format() {
        assert_eq!(current_time(&fixed_instant()), "현재 시간은 07:05:03입니다.");
    }

    #[test]
    fn test_current_date_format() {
        assert_eq!(current_date(&fixed_instant()), "오늘은 2024-03-09입니다.");
    }

    #[test]
    fn test_fixed_replies_ignore_clock() {
        let later = fixed_instant() + chrono::Duration::hours(5);
        assert_eq!(weather(&fixed_instant()), weather(&later));
        assert_eq!(news(&fixed_instant()), news(&later));
        assert_eq!(calculation(&fixed_instant()), calculation(&later));
    }
}
