//! UART console task
//!
//! Reads newline-terminated commands and answers each with one line:
//! `ok`, the requested information, or an error.
//!
//! Setting changes are written to flash straight away but only read back on
//! the next start, so the console keeps its own copy of what is stored.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use heapless::{String, Vec};

use horologe_core::console::{parse_line, ConsoleCommand, ConsoleError, HELP, MAX_LINE_LEN};
use horologe_core::config::ClockSettings;
use horologe_core::engine::ClockHandle;
use horologe_core::traits::WallTime;
use horologe_hal_rp2040::rtc::RtcClock;

use crate::config::embedded_settings;
use crate::store::StoreHandle;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Longest reply line
const REPLY_LEN: usize = 128;

type Reply = String<REPLY_LEN>;

/// Console task - control surface over UART0
#[embassy_executor::task]
pub async fn console_task(
    mut rx: BufferedUartRx,
    mut tx: BufferedUartTx,
    clock: &'static ClockHandle,
    rtc: RtcClock,
    mut store: StoreHandle,
    embedded: &'static str,
) {
    info!("Console task started");

    let mut session = Session {
        clock,
        rtc,
        stored: *clock.settings(),
        embedded,
    };

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut line: Vec<u8, MAX_LINE_LEN> = Vec::new();
    let mut overflow = false;

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            if byte != b'\n' && byte != b'\r' {
                if line.push(byte).is_err() {
                    overflow = true;
                }
                continue;
            }

            let reply = if overflow {
                Some(error_reply("line too long"))
            } else {
                match core::str::from_utf8(&line) {
                    Ok(text) => session.handle_line(text, &mut store),
                    Err(_) => Some(error_reply("invalid input")),
                }
            };
            line.clear();
            overflow = false;

            if let Some(reply) = reply {
                if let Err(e) = send(&mut tx, &reply).await {
                    warn!("UART write error: {:?}", e);
                }
            }
        }
    }
}

/// Console state between lines
struct Session {
    clock: &'static ClockHandle,
    rtc: RtcClock,
    /// Settings as last written to flash
    stored: ClockSettings,
    embedded: &'static str,
}

impl Session {
    /// Run one console line, returning the reply (`None` for a blank line)
    fn handle_line(&mut self, text: &str, store: &mut StoreHandle) -> Option<Reply> {
        let command = match parse_line(text) {
            Ok(command) => command,
            Err(ConsoleError::Empty) => return None,
            Err(e) => return Some(error_reply(e.as_str())),
        };
        debug!("Console command: {:?}", command);

        let clock = self.clock;
        let result = match command {
            ConsoleCommand::Start => clock.move_start().map_err(|e| e.as_str()),
            ConsoleCommand::Stop => clock.move_stop().map_err(|e| e.as_str()),
            ConsoleCommand::Step(steps) => clock.move_steps(steps).map_err(|e| e.as_str()),
            ConsoleCommand::SetHands { hour, minute } => {
                clock.update_position(hour, minute).map_err(|e| e.as_str())
            }
            ConsoleCommand::SetTime { hour, minute } => match WallTime::new(hour, minute, 0) {
                Some(time) => self.rtc.set_time(time).map_err(|_| "clock unavailable"),
                None => Err(ConsoleError::OutOfRange.as_str()),
            },
            ConsoleCommand::Save => clock.save_position(store).map_err(|_| "save failed"),
            ConsoleCommand::Status => return Some(status_reply(clock, &self.rtc)),
            ConsoleCommand::ShowConfig => return Some(self.config_reply()),
            ConsoleCommand::SetConfig(change) => {
                let mut next = self.stored;
                match next.apply(change) {
                    Ok(()) => match store.save_settings(&next) {
                        Ok(()) => {
                            self.stored = next;
                            return Some(text_reply("ok, restart to apply"));
                        }
                        Err(e) => {
                            warn!("Settings write failed: {:?}", e);
                            Err("save failed")
                        }
                    },
                    Err(e) => Err(e.as_str()),
                }
            }
            ConsoleCommand::Reset => match store.erase_all() {
                Ok(()) => {
                    self.stored = embedded_settings(self.embedded);
                    return Some(text_reply("ok, flash erased, restart to apply"));
                }
                Err(e) => {
                    warn!("Flash erase failed: {:?}", e);
                    Err("erase failed")
                }
            },
            ConsoleCommand::Help => return Some(text_reply(HELP)),
        };

        Some(match result {
            Ok(()) => text_reply("ok"),
            Err(message) => error_reply(message),
        })
    }

    fn config_reply(&self) -> Reply {
        let s = &self.stored;
        let mut reply = Reply::new();
        let _ = write!(
            reply,
            "steps_per_minute {} delay_time {} flip_rotation {} allow_backward {} chime {}",
            s.steps_per_minute,
            s.delay_time,
            on_off(s.flip_rotation),
            on_off(s.allow_backward),
            on_off(s.chime),
        );
        if self.stored != *self.clock.settings() {
            let _ = reply.push_str(" (restart to apply)");
        }
        reply
    }
}

fn status_reply(clock: &ClockHandle, rtc: &RtcClock) -> Reply {
    let mut reply = Reply::new();
    let time = clock.current_local_time(rtc);
    // Fits in REPLY_LEN
    let _ = write!(
        reply,
        "time {} hands {} calibrated {} positioning {} running {}",
        time.as_deref().unwrap_or("--:--"),
        clock.hands_position().as_str(),
        yes_no(clock.is_calibrated()),
        yes_no(clock.is_positioning()),
        yes_no(clock.is_running()),
    );
    reply
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn text_reply(text: &str) -> Reply {
    let mut reply = Reply::new();
    let _ = reply.push_str(text);
    reply
}

fn error_reply(message: &str) -> Reply {
    let mut reply = Reply::new();
    let _ = write!(reply, "error: {}", message);
    reply
}

async fn send(tx: &mut BufferedUartTx, reply: &str) -> Result<(), embassy_rp::uart::Error> {
    tx.write_all(reply.as_bytes()).await?;
    tx.write_all(b"\r\n").await?;
    tx.flush().await
}
