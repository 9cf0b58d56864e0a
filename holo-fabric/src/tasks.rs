//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task;
use tokio::time::sleep;

use crate::debug::Debug;
use crate::fabric::DeviceId;
use crate::southbound::{PortFilterInfo, RulePopulator};

// Number of consecutive unchanged filter results that ends the retry
// loop.
const MAX_CONSTANT_RETRY_ATTEMPTS: u32 = 5;
// Base delay between filter retry attempts.
const RETRY_INTERVAL: Duration = Duration::from_millis(250);
// Exponent applied to the attempt counter when scaling the delay.
const RETRY_INTERVAL_SCALE: u32 = 1;

/// A handle which can be used to manipulate the task created by the
/// [`Task::spawn`] function.
///
/// By default, dropping this handle cancels the task (unless
/// [`Task::detach`] is used).
#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
    detached: bool,
}

// ===== impl Task =====

impl<T> Task<T> {
    /// Spawns a new asynchronous task, returning a handle for it.
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future),
            detached: false,
        }
    }

    /// Detach the task, meaning it will no longer be canceled if its
    /// handle is dropped.
    pub fn detach(&mut self) {
        self.detached = true;
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, task::JoinError>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        Pin::new(&mut self.join_handle).poll(cx)
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        if !self.detached {
            self.join_handle.abort();
        }
    }
}

// ===== global functions =====

// Reapplies the MAC/VLAN port filters of a device until the result has
// been the same for five consecutive attempts, with linearly growing
// delays between attempts. A `None` result (ports not in the inventory
// yet) or a changed result keeps the loop going with a fresh attempt
// budget.
pub(crate) fn filter_retry(
    populator: Arc<dyn RulePopulator>,
    device: DeviceId,
    first_run: PortFilterInfo,
) -> Task<()> {
    Task::spawn(async move {
        let mut prev_run = first_run;
        let mut counter = 0u32;
        let mut constant_attempts = MAX_CONSTANT_RETRY_ATTEMPTS;
        let mut delay = RETRY_INTERVAL;

        loop {
            sleep(delay).await;
            counter += 1;
            Debug::FilterRetryAttempt(device, counter).log();

            let this_run =
                populator.populate_router_mac_vlan_filters(device);
            if this_run == Some(prev_run) {
                constant_attempts -= 1;
                if constant_attempts == 0 {
                    break;
                }
            } else {
                constant_attempts = MAX_CONSTANT_RETRY_ATTEMPTS;
            }
            if let Some(this_run) = this_run {
                prev_run = this_run;
            }
            delay = RETRY_INTERVAL * counter.pow(RETRY_INTERVAL_SCALE);
        }

        Debug::FilterRetryStable(device, counter).log();
    })
}
