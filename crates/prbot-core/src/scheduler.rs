//! Scheduled `open` reports.
//!
//! A single background job posts the open pull request report to one chat
//! whenever a standard 5-field cron expression (min hour dom mon dow, local
//! time) matches.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike, Local, Timelike};
use tokio::{sync::Mutex, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ReportSchedule,
    messaging::port::MessagingPort,
    router::{Command, CommandRouter},
    Error, Result,
};

#[derive(Clone)]
pub struct ReportScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    schedule: ReportSchedule,
    expr: CronExpr,
    router: CommandRouter,
    messenger: Arc<dyn MessagingPort>,
    cancel: CancellationToken,
    job: Mutex<Option<JoinHandle<()>>>,
}

impl ReportScheduler {
    pub fn new(
        schedule: ReportSchedule,
        router: CommandRouter,
        messenger: Arc<dyn MessagingPort>,
    ) -> Result<Self> {
        let expr = CronExpr::parse(&schedule.cron)
            .map_err(|e| Error::Config(format!("invalid REPORT_CRON {:?}: {e}", schedule.cron)))?;

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                schedule,
                expr,
                router,
                messenger,
                cancel: CancellationToken::new(),
                job: Mutex::new(None),
            }),
        })
    }

    /// Spawn the job loop. Calling this again while running is a no-op.
    pub async fn start(&self) {
        let mut job = self.inner.job.lock().await;
        if job.is_some() {
            return;
        }

        let scheduler = self.clone();
        *job = Some(tokio::spawn(async move { scheduler.job_loop().await }));

        tracing::info!(
            cron = %self.inner.schedule.cron,
            chat_id = self.inner.schedule.chat_id.0,
            next = ?self.next_run(),
            "scheduled report started"
        );
    }

    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.job.lock().await.take() {
            let _ = handle.await;
        }
    }

    pub fn next_run(&self) -> Option<DateTime<Local>> {
        self.inner.expr.next_after(Local::now())
    }

    /// Post one report to the scheduled chat right now.
    pub async fn run_once(&self) -> Result<()> {
        let chat_id = self.inner.schedule.chat_id;
        tracing::info!(chat_id = chat_id.0, "running scheduled report");
        self.inner
            .router
            .dispatch(chat_id, Command::Open, "", self.inner.messenger.as_ref())
            .await
    }

    async fn job_loop(&self) {
        loop {
            let Some(next) = self.next_run() else {
                tracing::error!(cron = %self.inner.schedule.cron, "schedule has no next run, stopping");
                break;
            };
            let wait = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = self.inner.cancel.cancelled() => break,
                _ = sleep(wait) => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!("scheduled report failed: {e}");
                    }
                }
            }
        }
    }
}

// === Cron expression engine ===

#[derive(Clone, Debug)]
struct CronExpr {
    minute: Field,
    hour: Field,
    dom: Field,
    month: Field,
    dow: Field,
}

/// Allowed values as a bitmask; `any` is true when every value in range is set.
#[derive(Clone, Copy, Debug)]
struct Field {
    bits: u64,
    any: bool,
}

impl CronExpr {
    fn parse(expr: &str) -> Result<Self> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = parts.as_slice() else {
            return Err(Error::Config(format!(
                "expected 5 fields, got {}",
                parts.len()
            )));
        };

        Ok(Self {
            minute: Field::parse(minute, 0, 59, false)?,
            hour: Field::parse(hour, 0, 23, false)?,
            dom: Field::parse(dom, 1, 31, false)?,
            month: Field::parse(month, 1, 12, false)?,
            dow: Field::parse(dow, 0, 6, true)?,
        })
    }

    fn matches(&self, dt: DateTime<Local>) -> bool {
        if !self.minute.contains(dt.minute())
            || !self.hour.contains(dt.hour())
            || !self.month.contains(dt.month())
        {
            return false;
        }

        // Both day fields restricted: either one matching is enough.
        let dom_match = self.dom.contains(dt.day());
        let dow_match = self.dow.contains(dt.weekday().num_days_from_sunday());
        match (self.dom.any, self.dow.any) {
            (true, true) => true,
            (true, false) => dow_match,
            (false, true) => dom_match,
            (false, false) => dom_match || dow_match,
        }
    }

    fn next_after(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let mut t = (now + chrono::Duration::minutes(1))
            .with_second(0)?
            .with_nanosecond(0)?;

        // One leap year of minutes bounds impossible expressions like `0 0 31 2 *`.
        for _ in 0..366 * 24 * 60 {
            if self.matches(t) {
                return Some(t);
            }
            t += chrono::Duration::minutes(1);
        }
        None
    }
}

impl Field {
    fn parse(raw: &str, min: u32, max: u32, sunday_is_7: bool) -> Result<Self> {
        let mut bits = 0u64;

        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (base, step) = match part.split_once('/') {
                Some((base, step)) => {
                    let step: u32 = step
                        .trim()
                        .parse()
                        .map_err(|_| Error::Config(format!("invalid step: {step}")))?;
                    if step == 0 {
                        return Err(Error::Config("step must be > 0".to_string()));
                    }
                    (base.trim(), step)
                }
                None => (part, 1),
            };

            let (start, end) = if base == "*" {
                (min, max)
            } else if let Some((a, b)) = base.split_once('-') {
                (
                    parse_value(a, sunday_is_7, min, max)?,
                    parse_value(b, sunday_is_7, min, max)?,
                )
            } else {
                let v = parse_value(base, sunday_is_7, min, max)?;
                if part.contains('/') {
                    (v, max)
                } else {
                    (v, v)
                }
            };

            if start > end {
                return Err(Error::Config(format!("invalid range: {base}")));
            }
            for v in (start..=end).step_by(step as usize) {
                bits |= 1 << v;
            }
        }

        if bits == 0 {
            return Err(Error::Config(format!("empty field: {raw:?}")));
        }

        let full = (min..=max).fold(0u64, |acc, v| acc | (1 << v));
        Ok(Self {
            bits,
            any: bits & full == full,
        })
    }

    fn contains(&self, v: u32) -> bool {
        v < 64 && self.bits & (1 << v) != 0
    }
}

fn parse_value(s: &str, sunday_is_7: bool, min: u32, max: u32) -> Result<u32> {
    let s = s.trim();
    let mut v: u32 = s
        .parse()
        .map_err(|_| Error::Config(format!("invalid number: {s}")))?;
    if sunday_is_7 && v == 7 {
        v = 0;
    }
    if v < min || v > max {
        return Err(Error::Config(format!("{v} out of range {min}-{max}")));
    }
    Ok(v)
}
