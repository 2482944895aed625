// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive loop: prompt, scan on Enter, wait, repeat.
//
// Stdin is read on a plain thread and forwarded over a channel so that a
// blocked read never holds up runtime shutdown. Scans run on the blocking
// pool. The first Ctrl-C lets the current image finish and then stops; a
// second one exits immediately.

use std::io::{self, BufRead};
use std::time::Duration;

use textlift_core::human_errors::humanize_error;
use textlift_imaging::TextRecognizer;
use textlift_pipeline::{CancelFlag, LoopState, LoopStatus, ScanLoop};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::console;
use crate::error::AppError;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Scan,
    Exit,
}

impl Command {
    /// `exit` in any case quits; any other line, including an empty one, scans.
    pub fn parse(line: &str) -> Self {
        if line.trim().eq_ignore_ascii_case("exit") {
            Self::Exit
        } else {
            Self::Scan
        }
    }
}

/// Why the shell stopped. All of these are a clean exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    UserExit,
    EndOfInput,
    Interrupted,
}

/// Cancellation shared with the scan loop, plus a way to await it.
pub struct Interrupts {
    cancel: CancelFlag,
    notified: watch::Receiver<bool>,
}

impl Interrupts {
    pub fn new(cancel: CancelFlag, notified: watch::Receiver<bool>) -> Self {
        Self { cancel, notified }
    }

    fn requested(&self) -> bool {
        self.cancel.is_cancelled() || *self.notified.borrow()
    }

    /// Resolves once an interrupt arrives; never, if the sender is gone.
    async fn triggered(&mut self) {
        if self.notified.wait_for(|hit| *hit).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Install the Ctrl-C handler. `status` tells it whether a scan is in flight.
pub fn listen_for_interrupts(status: LoopStatus) -> Interrupts {
    let cancel = CancelFlag::new();
    let (tx, rx) = watch::channel(false);
    let flag = cancel.clone();

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Could not listen for Ctrl-C");
            return;
        }
        match status.state() {
            LoopState::Scanning => warn!(
                "Interrupt received; finishing the current image. Press Ctrl-C again to quit now"
            ),
            LoopState::Idle => warn!("Interrupt received, exiting"),
        }
        flag.cancel();
        let _ = tx.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second interrupt, exiting");
            std::process::exit(0);
        }
    });

    Interrupts::new(cancel, rx)
}

/// Forward stdin lines to the shell. The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    let spawned = std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || forward_lines(io::stdin().lock(), &tx));
    if let Err(err) = spawned {
        error!(error = %err, "Could not start the console reader");
    }
    rx
}

/// Send each line of `reader` down `tx` until end of input.
///
/// Bytes that are not UTF-8 are replaced rather than rejected, so any line
/// reaches the prompt.
fn forward_lines(mut reader: impl BufRead, tx: &mpsc::Sender<io::Result<String>>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let line = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => Ok(String::from_utf8_lossy(&buf).into_owned()),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => Err(err),
        };
        let failed = line.is_err();
        if tx.blocking_send(line).is_err() || failed {
            return;
        }
    }
}

pub struct Shell<R> {
    scan_loop: ScanLoop<R>,
    interrupts: Interrupts,
    delay: Duration,
}

impl<R: TextRecognizer + 'static> Shell<R> {
    pub fn new(scan_loop: ScanLoop<R>, interrupts: Interrupts) -> Self {
        let delay = Duration::from_secs(scan_loop.config().rescan_delay_secs);
        Self {
            scan_loop,
            interrupts,
            delay,
        }
    }

    /// Drive the prompt until the user leaves, input ends, or an interrupt.
    ///
    /// # Errors
    ///
    /// Fatal pipeline errors (folder setup) and console failures.
    pub async fn run(
        self,
        mut lines: mpsc::Receiver<io::Result<String>>,
    ) -> Result<ShellExit, AppError> {
        let Shell {
            mut scan_loop,
            mut interrupts,
            delay,
        } = self;

        loop {
            if interrupts.requested() {
                return Ok(ShellExit::Interrupted);
            }
            console::prompt();

            let line = tokio::select! {
                _ = interrupts.triggered() => return Ok(ShellExit::Interrupted),
                line = lines.recv() => line,
            };
            let Some(line) = line else {
                println!();
                info!("Input closed, exiting");
                return Ok(ShellExit::EndOfInput);
            };
            if Command::parse(&line?) == Command::Exit {
                info!("Exiting program");
                return Ok(ShellExit::UserExit);
            }

            let cancel = interrupts.cancel.clone();
            let (returned, result) = tokio::task::spawn_blocking(move || {
                let result = scan_loop.scan_once(&cancel);
                (scan_loop, result)
            })
            .await?;
            scan_loop = returned;

            match result {
                Ok(report) => console::print_summary(&report),
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    let human = humanize_error(&err);
                    error!(error = %err, hint = %human.suggestion, "{}", human.message);
                }
            }
            if interrupts.requested() {
                return Ok(ShellExit::Interrupted);
            }

            if !delay.is_zero() {
                info!("Waiting {} seconds before the next scan", delay.as_secs());
                tokio::select! {
                    _ = interrupts.triggered() => return Ok(ShellExit::Interrupted),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
