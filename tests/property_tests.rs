//! Property-based tests for nlog using proptest

use nlog::formatters::{ConsoleFormatter, FormatterConfig, JsonFormatter, TimeResolution};
use nlog::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Sink for Capture {
    fn write_line(&mut self, _level: Level, line: &[u8]) -> io::Result<()> {
        self.0.lock().extend_from_slice(line);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn any_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Fatal),
        Just(Level::Error),
        Just(Level::Warning),
        Just(Level::Notice),
        Just(Level::Info),
        Just(Level::Debug),
    ]
}

fn any_resolution() -> impl Strategy<Value = TimeResolution> {
    prop_oneof![
        Just(TimeResolution::Hour),
        Just(TimeResolution::Minute),
        Just(TimeResolution::Second),
        Just(TimeResolution::Millisecond),
        Just(TimeResolution::Microsecond),
        Just(TimeResolution::Nanosecond),
    ]
}

fn json_logger(cap: &Capture, min_level: Level) -> Logger {
    Logger::builder()
        .min_level(min_level)
        .formatter(JsonFormatter::new(
            FormatterConfig::builder()
                .level(Level::Debug)
                .writer(cap.clone(), Level::Debug)
                .build(),
        ))
        .build()
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    #[test]
    fn test_level_str_roundtrip(level in any_level()) {
        prop_assert_eq!(level.to_str().parse::<Level>().unwrap(), level);
        prop_assert_eq!(level.code().parse::<Level>().unwrap(), level);
        prop_assert_eq!(level.to_string(), level.to_str());
    }

    #[test]
    fn test_level_ordering_matches_discriminant(a in any_level(), b in any_level()) {
        prop_assert_eq!(a.enabled(b), (a as u8) <= (b as u8));
    }

    #[test]
    fn test_unknown_level_uses_default(s in "[a-z]{6,12}", default in any_level()) {
        prop_assume!(s.parse::<Level>().is_err());
        prop_assert_eq!(Level::parse_or(&s, default), default);
    }

    /// An event is emitted exactly when it is at least as severe as the logger's level
    #[test]
    fn test_logger_level_filtering(min in any_level(), event in any_level()) {
        let cap = Capture::default();
        let logger = json_logger(&cap, min);

        logger.log(event).str("k", "v").msg("m");
        logger.logf(event, format_args!("f"));

        let lines = cap.text().lines().count();
        if event <= min {
            prop_assert_eq!(lines, 2);
        } else {
            prop_assert_eq!(lines, 0);
        }
    }

    #[test]
    fn test_resolution_roundtrip(res in any_resolution()) {
        prop_assert_eq!(res.as_str().parse::<TimeResolution>().unwrap(), res);
        prop_assert_eq!(TimeResolution::parse_or("bogus", res), res);
    }
}

// ============================================================================
// Output Format Tests
// ============================================================================

proptest! {
    /// Every JSON line parses and holds exactly the supplied keys plus level and msg
    #[test]
    fn test_json_lines_are_valid(
        msg in any::<String>(),
        values in prop::collection::vec(any::<String>(), 0..8),
        ints in prop::collection::vec(any::<i64>(), 0..4),
    ) {
        let cap = Capture::default();
        let logger = json_logger(&cap, Level::Debug);

        let mut item = logger.info();
        let mut expected: BTreeSet<String> = ["level", "msg"].iter().map(|s| s.to_string()).collect();
        for (i, value) in values.iter().enumerate() {
            let key = format!("s{}", i);
            item = item.str(&key, value);
            expected.insert(key);
        }
        for (i, value) in ints.iter().enumerate() {
            let key = format!("n{}", i);
            item = item.int(&key, *value);
            expected.insert(key);
        }
        item.msg(&msg);

        let text = cap.text();
        prop_assert!(text.ends_with('\n'));
        let v: Value = serde_json::from_str(text.trim_end_matches('\n')).unwrap();
        let keys: BTreeSet<String> = v.as_object().unwrap().keys().cloned().collect();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(v["msg"].as_str().unwrap(), msg.as_str());
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(v[format!("s{}", i)].as_str().unwrap(), value.as_str());
        }
        for (i, value) in ints.iter().enumerate() {
            prop_assert_eq!(v[format!("n{}", i)].as_i64().unwrap(), *value);
        }
    }

    /// Whatever is chained onto a filtered item, nothing is written
    #[test]
    fn test_disabled_item_writes_nothing(
        s in any::<String>(),
        i in any::<i64>(),
        f in any::<f64>(),
        list in prop::collection::vec(any::<u32>(), 0..5),
    ) {
        let cap = Capture::default();
        let logger = json_logger(&cap, Level::Error);

        logger
            .debug()
            .str("s", &s)
            .int("i", i)
            .float64("f", f)
            .uints("list", &list)
            .err_opt::<io::Error>(None)
            .with("none", None::<String>)
            .strs("empty", &Vec::<String>::new())
            .msg(&s);

        prop_assert!(cap.text().is_empty());
        prop_assert_eq!(logger.item_metrics().allocated(), 0);
    }

    #[test]
    fn test_quoted_strings_match_serde(s in any::<String>()) {
        let mut buf = Buffer::new();
        buf.append_str(&s, true);
        prop_assert_eq!(buf.as_str_lossy().into_owned(), serde_json::to_string(&s).unwrap());
    }

    #[test]
    fn test_console_line_shape(msg in "[a-zA-Z0-9 ]{0,40}", prefix in "[a-z]{0,8}") {
        let cap = Capture::default();
        let logger = Logger::builder()
            .prefix(prefix.as_str())
            .formatter(ConsoleFormatter::new(
                FormatterConfig::builder()
                    .writer(cap.clone(), Level::Debug)
                    .build(),
            ))
            .build();

        logger.warn().msg(&msg);

        let expected = if prefix.is_empty() {
            format!("WRN {}\n", msg)
        } else {
            format!("WRN [{}] {}\n", prefix, msg)
        };
        prop_assert_eq!(cap.text(), expected);
    }

    #[test]
    fn test_float_lists_stay_numeric(vals in prop::collection::vec(-1.0e9f64..1.0e9, 0..6)) {
        let cap = Capture::default();
        let logger = json_logger(&cap, Level::Debug);
        logger.info().floats64("v", &vals).msg("m");

        let v: Value = serde_json::from_str(cap.text().trim_end()).unwrap();
        let parsed: Vec<f64> = v["v"].as_array().unwrap().iter().map(|x| x.as_f64().unwrap()).collect();
        prop_assert_eq!(parsed, vals);
    }

    /// NaN and infinities are carried as strings so the line still parses
    #[test]
    fn test_any_float_keeps_json_valid(
        f in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY), any::<f64>()],
    ) {
        let cap = Capture::default();
        let logger = json_logger(&cap, Level::Debug);
        logger.info().float64("f", f).floats64("v", &[f, 0.5]).msg("m");

        let v: Value = serde_json::from_str(cap.text().trim_end()).unwrap();
        if f.is_finite() {
            let parsed = v["f"].as_f64().unwrap();
            prop_assert!((parsed - f).abs() <= f.abs() * 1e-12);
        } else {
            prop_assert!(v["f"].is_string());
            prop_assert_eq!(&v["v"][0], &v["f"]);
        }
    }
}
