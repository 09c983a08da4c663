//! Element resolution engine.
//!
//! Turns a [`Selector`] plus a search [`Scope`] into live [`Element`]s by
//! polling the remote driver at a fixed interval until something matches or
//! the wait budget runs out. Success returns immediately; there is no settle
//! delay.
//!
//! Budgets are `Option<Duration>`: `None` takes the driver default, and
//! `Some(Duration::ZERO)` means exactly one attempt.
//!
//! The rewrite hook runs once per call, before the first attempt. Transport
//! errors abort the wait on the spot.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::page::{Element, Selector};
use crate::remote::Scope;

use super::Driver;

/// Longest wait honored; larger budgets are clamped to it.
const MAX_BUDGET: Duration = Duration::from_secs(u32::MAX as u64);

// ============================================================================
// Resolution
// ============================================================================

/// `started + budget`, clamped so oversized budgets wait "forever".
fn deadline_after(started: Instant, budget: Duration) -> Instant {
    started
        .checked_add(budget.min(MAX_BUDGET))
        .or_else(|| started.checked_add(Duration::from_secs(86_400)))
        .unwrap_or(started)
}

/// Resolves exactly one element.
///
/// # Errors
///
/// - [`Error::ElementNotFound`] once the budget elapses with no match
/// - [`Error::InvalidSelector`] if the (rewritten) selector is blank
/// - whatever the remote driver returns, unchanged
pub async fn resolve(
    driver: &Driver,
    scope: &Scope,
    selector: &Selector,
    budget: Option<Duration>,
) -> Result<Element> {
    let selector = driver.prepare(selector)?;
    let budget = budget.unwrap_or_else(|| driver.options().wait());
    let poll_interval = driver.options().poll_interval();
    let started = Instant::now();
    let deadline = deadline_after(started, budget);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        trace!(%selector, ?scope, attempts, "Lookup attempt");

        if let Some(id) = driver.remote().find_one(scope, &selector).await? {
            debug!(
                %selector,
                element_id = %id,
                attempts,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Element resolved"
            );
            return Ok(Element::new(id, driver.clone()));
        }

        let now = Instant::now();
        if now >= deadline {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            debug!(%selector, attempts, elapsed_ms, "Element not found");
            return Err(Error::element_not_found(selector.to_string(), elapsed_ms));
        }

        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Resolves every match, in the order the remote driver reports them.
///
/// Polls like [`resolve`] until the first non-empty answer. Running out of
/// budget yields an empty list, not an error.
pub async fn resolve_all(
    driver: &Driver,
    scope: &Scope,
    selector: &Selector,
    budget: Option<Duration>,
) -> Result<Vec<Element>> {
    let selector = driver.prepare(selector)?;
    let budget = budget.unwrap_or_else(|| driver.options().wait());
    let poll_interval = driver.options().poll_interval();
    let started = Instant::now();
    let deadline = deadline_after(started, budget);

    loop {
        trace!(%selector, ?scope, "Lookup-all attempt");

        let ids = driver.remote().find_all(scope, &selector).await?;
        let now = Instant::now();

        if !ids.is_empty() || now >= deadline {
            debug!(
                %selector,
                count = ids.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Elements resolved"
            );
            return Ok(ids
                .into_iter()
                .map(|id| Element::new(id, driver.clone()))
                .collect());
        }

        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Like [`resolve`], but `Ok(None)` when nothing matched in time.
///
/// Only [`Error::ElementNotFound`] is absorbed.
pub async fn resolve_optional(
    driver: &Driver,
    scope: &Scope,
    selector: &Selector,
    budget: Option<Duration>,
) -> Result<Option<Element>> {
    match resolve(driver, scope, selector, budget).await {
        Ok(element) => Ok(Some(element)),
        Err(err) if err.is_element_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

// ============================================================================
// Tests
// ============================================================================
