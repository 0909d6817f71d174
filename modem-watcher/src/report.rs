// SPDX-License-Identifier: GPL-3.0-only

//! Renders watch events as the line-oriented `[ModemWatcher]` output.

use std::io::{self, Write};

use modem_dbus::WatchEvent;

pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One line per event; a failed modem gets one extra annotation line
    /// right after its added line. The modem is still reported either way.
    pub fn handle(&mut self, event: &WatchEvent) -> io::Result<()> {
        match event {
            WatchEvent::ServiceAppeared => {
                writeln!(self.out, "[ModemWatcher] ModemManager service is available in bus")
            }
            WatchEvent::ServiceVanished => {
                writeln!(self.out, "[ModemWatcher] ModemManager service not available in bus")
            }
            WatchEvent::ModemAdded(modem) => {
                writeln!(
                    self.out,
                    "[ModemWatcher] {} ({}) modem managed by ModemManager [{}]: {}",
                    modem.manufacturer, modem.model, modem.equipment_id, modem.path
                )?;
                if modem.state.is_failed() {
                    writeln!(
                        self.out,
                        "[ModemWatcher,{}] ignoring failed modem",
                        modem.index()
                    )?;
                }
                Ok(())
            }
            WatchEvent::ModemRemoved { path } => {
                writeln!(
                    self.out,
                    "[ModemWatcher] modem unmanaged by ModemManager: {path}"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modem_types::{ModemInfo, ModemState};

    fn modem(index: u32, state: ModemState) -> ModemInfo {
        ModemInfo {
            path: format!("/org/freedesktop/ModemManager1/Modem/{index}"),
            manufacturer: "Sierra Wireless".to_string(),
            model: "EM7345".to_string(),
            equipment_id: "013937003000000".to_string(),
            state,
        }
    }

    fn render(events: &[WatchEvent]) -> Vec<String> {
        let mut buffer = Vec::new();
        let mut reporter = Reporter::new(&mut buffer);
        for event in events {
            reporter.handle(event).unwrap();
        }
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn presence_lines_are_exact() {
        let lines = render(&[WatchEvent::ServiceAppeared, WatchEvent::ServiceVanished]);
        assert_eq!(
            lines,
            vec![
                "[ModemWatcher] ModemManager service is available in bus",
                "[ModemWatcher] ModemManager service not available in bus",
            ]
        );
    }

    #[test]
    fn added_modem_yields_one_line_with_identity_and_path() {
        let lines = render(&[WatchEvent::ModemAdded(modem(0, ModemState::Registered))]);
        assert_eq!(
            lines,
            vec![
                "[ModemWatcher] Sierra Wireless (EM7345) modem managed by ModemManager \
                 [013937003000000]: /org/freedesktop/ModemManager1/Modem/0",
            ]
        );
    }

    #[test]
    fn failed_modem_gets_exactly_one_extra_line_right_after() {
        let lines = render(&[WatchEvent::ModemAdded(modem(7, ModemState::Failed))]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("modem managed by ModemManager"));
        assert_eq!(lines[1], "[ModemWatcher,7] ignoring failed modem");
    }

    #[test]
    fn removed_modem_logs_its_path_regardless_of_state() {
        let lines = render(&[WatchEvent::ModemRemoved {
            path: "/org/freedesktop/ModemManager1/Modem/3".to_string(),
        }]);
        assert_eq!(
            lines,
            vec!["[ModemWatcher] modem unmanaged by ModemManager: /org/freedesktop/ModemManager1/Modem/3"]
        );
    }

    #[test]
    fn startup_enumeration_renders_in_event_order() {
        let events: Vec<WatchEvent> = std::iter::once(WatchEvent::ServiceAppeared)
            .chain((0..3).map(|i| WatchEvent::ModemAdded(modem(i, ModemState::Enabled))))
            .collect();
        let lines = render(&events);
        assert_eq!(lines.len(), 4);
        for (i, line) in lines[1..].iter().enumerate() {
            assert!(line.ends_with(&format!("/org/freedesktop/ModemManager1/Modem/{i}")));
        }
    }
}
