/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages and sinks for spline solves.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for spline solves.
//!
//! A solve reports its milestones to an optional [`ProgressSink`]. The
//! [`closure_sink`] helper forwards each message to a closure running on a
//! listener thread, so the solve itself never blocks on the handler.

use crate::config::NormalizationMode;
use std::fmt::Debug;
use std::sync::{Arc, mpsc};
use std::thread;

/// Progress events emitted while a spline is being solved.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMsg {
    /// The linear system has been assembled.
    SystemAssembled {
        /// Number of rows (value plus gradient constraints).
        size: usize,
        /// Formatted footprint of the square matrix, e.g. `"7.8 kb"`.
        memory: String,
    },

    /// Smallest and largest separation seen while assembling the system.
    RadiusRange { min: f64, max: f64 },

    /// Trend removal or range scaling was dropped because gradients are present.
    NormalizationDowngraded {
        requested: NormalizationMode,
        applied: NormalizationMode,
    },

    /// Singular value ratios `w[i] / w[0]`, sorted in descending order.
    SingularValues { ratios: Vec<f64> },

    /// Number of singular values kept by the truncated SVD.
    RankRetained { used: usize, total: usize },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// Messages are dropped rather than blocking the solve when more than
/// `buffer` of them are waiting. The thread exits once every clone of the
/// returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_sink_delivers_messages_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&seen);
        let (sink, handle) = closure_sink(8, move |msg| store.lock().unwrap().push(msg));

        sink.emit(ProgressMsg::RankRetained { used: 2, total: 3 });
        sink.emit(ProgressMsg::Message {
            message: "done".into(),
        });
        drop(sink);
        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ProgressMsg::RankRetained { used: 2, total: 3 },
                ProgressMsg::Message {
                    message: "done".into()
                },
            ]
        );
    }
}
