/// Format milliseconds as `M:SS`. Minutes are not wrapped into hours.
pub fn format_time(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
