mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;
    use loadgrid::prelude::*;
    use loadgrid_runtime::{LoadgridRuntime, Runner};
    use reqwest::StatusCode;
    use std::time::{Duration, Instant};

    fn config(address: &str, profiles: &[&str], pacing: Duration) -> RunConfig {
        RunConfig::builder()
            .hosts(vec![Host::new("target", address)])
            .profiles(Catalog::builtin().select(profiles).unwrap())
            .pacing(pacing)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn driver_passes_check_against_echoing_target() {
        init().await;

        let config = config(ECHO_ADDR, &["highmem"], Duration::from_millis(10));
        let scenario = config.scenarios().values().next().unwrap();
        assert_eq!(
            scenario.exec.url().as_str(),
            format!("http://{ECHO_ADDR}/highmem?count=15")
        );

        let outcome = scenario.exec.run().await;
        assert_eq!(outcome.status, Some(StatusCode::OK));
        assert!(outcome.body.contains("highmem"));
        assert!(outcome.waiting <= outcome.duration);

        assert_eq!(scenario.exec.checks().passed(), 1);
        assert_eq!(scenario.exec.checks().failed(), 0);
        for dimension in Dimension::ALL {
            let recorder = config
                .registry()
                .lookup(scenario.exec.key(), dimension)
                .unwrap();
            assert_eq!(recorder.samples().len(), 1);
        }
    }

    #[tokio::test]
    async fn missing_text_fails_check_without_cutting_iteration_short() {
        init().await;

        let pacing = Duration::from_millis(100);
        let config = config(BLANK_ADDR, &["highmem"], pacing);
        let scenario = config.scenarios().values().next().unwrap();

        let start = Instant::now();
        let outcome = scenario.exec.run().await;

        assert_eq!(outcome.status, Some(StatusCode::OK));
        assert!(!outcome.body.contains("highmem"));
        assert!(start.elapsed() >= pacing);
        assert_eq!(scenario.exec.checks().failed(), 1);
        assert_eq!(scenario.exec.recorders().waiting.samples().len(), 1);
        assert_eq!(scenario.exec.recorders().duration.samples().len(), 1);
    }

    #[tokio::test]
    async fn cpu_profile_round_trip() {
        init().await;

        let config = config(ECHO_ADDR, &["highcpu"], Duration::ZERO);
        let scenario = config.scenarios().values().next().unwrap();
        let outcome = scenario.exec.run().await;

        assert!(outcome.body.starts_with("highcpu: computed 333000 rounds"));
        assert_eq!(scenario.exec.checks().passed(), 1);
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn runtime_drives_matrix_to_completion() {
        init().await;

        let report = LoadgridRuntime::new()
            .profiles(&["highmem", "lowload"])
            .hosts(&[
                Host::new("target", ECHO_ADDR),
                Host::new("blank", BLANK_ADDR),
            ])
            .duration(Duration::from_secs(2))
            .pacing(Duration::from_millis(10))
            .runner(Runner::new().tick(Duration::from_millis(100)))
            .run()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.scenarios.len(), 4);

        for key in ["target_highmem", "target_lowload"] {
            let scenario = report.scenario(key).unwrap();
            assert!(scenario.iterations > 0, "{key} never ran");
            assert_eq!(scenario.checks_failed, 0);
            assert_eq!(scenario.checks_passed, scenario.iterations);
            assert_eq!(scenario.duration.count as u64, scenario.iterations);
        }

        for key in ["blank_highmem", "blank_lowload"] {
            let scenario = report.scenario(key).unwrap();
            assert!(scenario.iterations > 0, "{key} never ran");
            assert_eq!(scenario.checks_passed, 0);
            assert_eq!(scenario.checks_failed, scenario.iterations);
        }
    }
}
