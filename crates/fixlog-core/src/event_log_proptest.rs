#[cfg(test)]
mod proptest_event_log {
    use crate::event_log::EventLog;
    use crate::timebase::ManualClock;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Buffer is exactly the concatenation of "+%04d: %s\n" over consecutive gaps
        #[test]
        fn buffer_matches_consecutive_deltas(
            start in 0u64..1_000_000,
            steps in prop::collection::vec((0u64..50_000, "[a-zA-Z0-9 .,:()\\[\\]-]{0,40}"), 1..40),
        ) {
            let clock = ManualClock::new(start);
            let mut log = EventLog::new(clock.clone());

            let mut expected = String::new();
            for (gap, message) in &steps {
                clock.advance(*gap);
                log.append(message.clone());
                expected.push_str(&format!("+{:04}: {}\n", gap, message));
            }

            prop_assert_eq!(log.buffer(), expected.as_str());
            prop_assert_eq!(log.len(), steps.len());
            let total: u64 = steps.iter().map(|(gap, _)| gap).sum();
            prop_assert_eq!(log.last_event_time_ms(), start + total);
        }

        // The delta field is never narrower than four digits and never truncated
        #[test]
        fn delta_field_never_truncates(delta in 0u64..10_000_000) {
            let clock = ManualClock::new(0);
            let mut log = EventLog::new(clock.clone());
            clock.set(delta);
            log.append("x");

            let line = log.buffer();
            let digits = &line[1..line.find(':').unwrap()];
            prop_assert!(digits.len() >= 4);
            prop_assert_eq!(digits.parse::<u64>().unwrap(), delta);
        }
    }
}
