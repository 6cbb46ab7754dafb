// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Broadcast of one record stream to every branch of a fan-out node.

use futures::future::join_all;

use crate::observability::messages::engine::BranchDetached;
use crate::streams::{RecordSink, RecordSource};

/// One branch's inbound channel as seen by the tee.
pub(crate) struct Tap {
    pub branch: String,
    pub sink: RecordSink,
    pub delivered: usize,
}

impl Tap {
    pub fn new(branch: impl Into<String>, sink: RecordSink) -> Self {
        Self {
            branch: branch.into(),
            sink,
            delivered: 0,
        }
    }
}

/// Copy every record from `source` to every tap, in order, until `source`
/// is closed. Returns the number of records read from `source`.
///
/// A record is offered to all taps at once, so one slow branch only holds
/// the others back by the depth of its channel. A tap whose receiver is gone
/// is detached; the source keeps being drained even with no taps left, so
/// the unit feeding it never blocks. Taps are dropped on return, which is
/// what closes every branch's input.
pub(crate) async fn broadcast(node: &str, mut source: RecordSource, mut taps: Vec<Tap>) -> usize {
    let mut records = 0;

    while let Some(record) = source.recv().await {
        records += 1;
        if taps.is_empty() {
            continue;
        }

        let results = join_all(taps.iter().map(|tap| tap.sink.send(record.clone()))).await;
        for (index, result) in results.into_iter().enumerate().rev() {
            match result {
                Ok(()) => taps[index].delivered += 1,
                Err(_) => {
                    let tap = taps.remove(index);
                    tracing::debug!(
                        "{}",
                        BranchDetached {
                            node,
                            branch: &tap.branch,
                            records_delivered: tap.delivered,
                        }
                    );
                }
            }
        }
    }

    records
}
