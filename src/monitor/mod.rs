//! Periodic capture, analyze and log cycle. The loop is sequential: the
//! next tick is awaited only after the current cycle finishes, so two cycles
//! never write the same daily files concurrently.

pub mod capture;
pub mod model;
pub mod prompt;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use chrono::SecondsFormat;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    analysis::{normalize::normalize, normalize::ResponseFormat, store::AnalysisStore},
    journal::{line::LogLine, store::JournalStore},
    projects::store::ProjectStore,
    usage::UsageLedger,
    utils::{clock::Clock, time::line_time_stamp},
};

use self::{
    capture::ScreenCapture,
    model::{estimate_tokens, AnalysisModel},
    prompt::build_analysis_prompt,
};

/// Ledger key under which the monitor books its token spend.
pub const MONITOR_AGENT: &str = "screenshot";

pub struct MonitorConfig {
    pub interval: Duration,
    pub model_name: String,
    pub format: ResponseFormat,
    pub screenshot_dir: PathBuf,
}

/// Owns every store touched during a cycle, which serializes all writes to
/// the shared daily files through one place.
pub struct Monitor {
    capture: Box<dyn ScreenCapture>,
    model: Box<dyn AnalysisModel>,
    journal: JournalStore,
    analysis: AnalysisStore,
    projects: ProjectStore,
    ledger: UsageLedger,
    clock: Box<dyn Clock>,
    shutdown: CancellationToken,
    config: MonitorConfig,
}

impl Monitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capture: Box<dyn ScreenCapture>,
        model: Box<dyn AnalysisModel>,
        journal: JournalStore,
        analysis: AnalysisStore,
        projects: ProjectStore,
        ledger: UsageLedger,
        clock: Box<dyn Clock>,
        shutdown: CancellationToken,
        config: MonitorConfig,
    ) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&config.screenshot_dir)?;
        Ok(Self {
            capture,
            model,
            journal,
            analysis,
            projects,
            ledger,
            clock,
            shutdown,
            config,
        })
    }

    /// Executes the monitor event loop until cancelled. A failed cycle is
    /// reported and the loop keeps going; cancellation lets the in-flight
    /// cycle complete.
    pub async fn run(mut self) -> Result<()> {
        let mut cycle_point = self.clock.instant();
        loop {
            cycle_point += self.config.interval;

            match self.run_cycle().await {
                Ok(timestamp) => info!("Completed analysis cycle at {timestamp}"),
                Err(e) => error!("Analysis cycle failed {e:?}"),
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.ledger.flush().await?;
                    return Ok(())
                }
                _ = self.clock.sleep_until(cycle_point) => ()
            }
        }
    }

    /// One capture, analyze, normalize, log sequence. Returns the timestamp
    /// the record was stored under.
    pub async fn run_cycle(&mut self) -> Result<String> {
        let now = self.clock.time();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, false);

        let shot_path = self
            .config
            .screenshot_dir
            .join(format!("screenshot-{}.png", timestamp.replace([':', '.'], "-")));
        self.capture.capture(&shot_path).await?;

        let projects = self.projects.load().await?;
        let prompt = build_analysis_prompt(&projects, self.config.format);

        let reply = self.model.invoke(&prompt, Some(&shot_path)).await?;
        let tokens = reply
            .tokens
            .unwrap_or_else(|| estimate_tokens(&prompt, &reply.text));

        let record = normalize(&reply.text, self.config.format);
        self.analysis.log_result(&timestamp, &record).await?;

        self.ledger
            .increment(
                MONITOR_AGENT,
                &self.config.model_name,
                tokens,
                now.date_naive(),
            )
            .await?;

        let line = LogLine::new(
            line_time_stamp(now),
            "reflection",
            vec![("model".to_string(), self.config.model_name.clone())],
            format!("{}: {}", record.status, record.summary.replace('\n', " ")),
        );
        self.journal
            .write_line(&line.compose(), &line.kind, now.date_naive())
            .await?;

        Ok(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tempfile::tempdir;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use crate::{
        analysis::{normalize::ResponseFormat, record::AnalysisStatus, store::AnalysisStore},
        journal::store::JournalStore,
        monitor::model::ModelReply,
        monitor::{capture::MockScreenCapture, model::MockAnalysisModel},
        projects::store::ProjectStore,
        usage::UsageLedger,
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    use super::{Monitor, MonitorConfig, MONITOR_AGENT};

    const TEST_START_DATE: NaiveDateTime = NaiveDateTime::new(
        match NaiveDate::from_ymd_opt(2018, 7, 4) {
            Some(v) => v,
            None => panic!(),
        },
        NaiveTime::MIN,
    );

    struct TestClock {
        start_time: DateTime<Local>,
        reference: Instant,
    }

    impl TestClock {
        fn new() -> Self {
            Self {
                start_time: Local.from_utc_datetime(&TEST_START_DATE),
                reference: Instant::now(),
            }
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    const FENCED_REPLY: &str = "```json\n{\"status\": \"On Task\", \"summary\": \"Editing\"}\n```";

    async fn build_monitor(
        data_dir: &std::path::Path,
        shutdown: CancellationToken,
        interval: Duration,
    ) -> Result<Monitor> {
        let mut capture = MockScreenCapture::new();
        capture.expect_capture().returning(|_| Ok(()));

        let mut model = MockAnalysisModel::new();
        model.expect_invoke().returning(|_, _| {
            Ok(ModelReply {
                text: FENCED_REPLY.to_string(),
                tokens: Some(17),
            })
        });

        Monitor::new(
            Box::new(capture),
            Box::new(model),
            JournalStore::new(data_dir)?,
            AnalysisStore::new(data_dir)?,
            ProjectStore::new(data_dir),
            UsageLedger::load(data_dir).await?,
            Box::new(TestClock::new()),
            shutdown,
            MonitorConfig {
                interval,
                model_name: "vision-1".to_string(),
                format: ResponseFormat::FencedJson,
                screenshot_dir: PathBuf::from(data_dir).join("screenshots"),
            },
        )
        .map_err(Into::into)
    }

    #[tokio::test]
    async fn test_single_cycle_produces_all_artifacts() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let mut monitor =
            build_monitor(dir.path(), CancellationToken::new(), Duration::from_secs(600)).await?;

        let timestamp = monitor.run_cycle().await?;

        let analysis = AnalysisStore::new(dir.path())?;
        let paths = analysis.last_x_paths(1)?;
        assert_eq!(paths.len(), 1);
        let entries = analysis.read_file(&paths[0]).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, timestamp);
        assert_eq!(entries[0].1.status, AnalysisStatus::OnTask);

        let ledger = UsageLedger::load(dir.path()).await?;
        let usage = ledger.get(MONITOR_AGENT, "vision-1").unwrap();
        assert_eq!(usage.total, 17);

        let journal = JournalStore::new(dir.path())?;
        let lines = journal.read_day(TEST_START_DATE.date()).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, "reflection");
        assert!(lines[0].message.contains("On Task: Editing"));
        Ok(())
    }

    /// Smoke test for the whole loop: run briefly, cancel, then check what
    /// landed on disk.
    #[tokio::test]
    async fn smoke_test_monitor_loop() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let shutdown = CancellationToken::new();
        let monitor =
            build_monitor(dir.path(), shutdown.clone(), Duration::from_millis(100)).await?;

        let (_, run_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(350)).await;
                shutdown.cancel()
            },
            monitor.run(),
        );
        run_result?;

        let analysis = AnalysisStore::new(dir.path())?;
        let paths = analysis.last_x_paths(5)?;
        assert_eq!(paths.len(), 1);
        let entries = analysis.read_file(&paths[0]).await?;
        assert!(entries.len() >= 2);

        let ledger = UsageLedger::load(dir.path()).await?;
        let usage = ledger.get(MONITOR_AGENT, "vision-1").unwrap();
        assert_eq!(usage.total, 17 * entries.len() as u64);
        Ok(())
    }
}
