//! Response head tracking for one hop: status line and `Location`.

/// What we need from a response head to decide between redirect, body and failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status: Option<u32>,
    pub location: Option<String>,
}

impl ResponseHead {
    /// Feed one raw header line as delivered by libcurl's header callback.
    /// A new status line resets previously seen headers (e.g. after `100 Continue`).
    pub fn observe(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead {
                status: parse_status_line(line),
                location: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("location") {
                let value = value.trim();
                if !value.is_empty() {
                    self.location = Some(value.to_string());
                }
            }
        }
    }

    /// True once a 200 head has been seen; body bytes are only kept then.
    pub fn is_ok(&self) -> bool {
        self.status == Some(200)
    }
}

/// `HTTP/1.1 302 Found` → 302. Also handles `HTTP/2 200`.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
