use rstest::rstest;
use telelog::{DefaultFormatter, LogFormatter, LogLevel, LogRecord, TemplateFormatter};

#[rstest]
#[case("core", LogLevel::Info, "hello", "core [INFO] hello")]
#[case("sys", LogLevel::Error, "fail", "sys [ERROR] fail")]
#[case("", LogLevel::Info, "", " [INFO] ")]
#[case("core", LogLevel::Warn, "⚠", "core [WARNING] ⚠")]
fn default_formatter_formats(
    #[case] logger: &str,
    #[case] level: LogLevel,
    #[case] message: &str,
    #[case] expected: &str,
) {
    let record = LogRecord::new(logger, level, message);
    assert_eq!(DefaultFormatter.format(&record), expected);
}

#[rstest]
#[case(LogLevel::Error, "<b>[ERROR]</b> jobs.sync\nsync failed")]
#[case(LogLevel::Critical, "<b>[CRITICAL]</b> jobs.sync\nsync failed")]
fn telegram_template_renders_markup(#[case] level: LogLevel, #[case] expected: &str) {
    let formatter = TemplateFormatter::new("<b>[%(levelname)s]</b> %(name)s\n%(message)s");
    let record = LogRecord::new("jobs.sync", level, "sync failed");
    assert_eq!(formatter.format(&record), expected);
}

#[rstest]
fn console_template_starts_with_timestamp() {
    let formatter = TemplateFormatter::new("%(asctime)s - %(name)s - %(levelname)s - %(message)s");
    let rendered = formatter.format(&LogRecord::new("app", LogLevel::Warn, "careful"));
    let (asctime, rest) = rendered.split_once(" - ").expect("separator present");
    assert_eq!(rest, "app - WARNING - careful");
    // e.g. 2024-05-01 12:30:45,123
    assert_eq!(asctime.len(), 23, "{asctime}");
}
