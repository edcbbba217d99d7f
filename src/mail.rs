//! Mail transport collaborators — IMAP fetch (inbound), SMTP via lettre
//! (outbound).
//!
//! Thin, stateless wrappers: one connection per call, no pooling, no retry.
//! The blocking IMAP work runs inside `spawn_blocking`; TLS is rustls with
//! webpki roots. Fetch failures propagate as [`MailError`] (logged and
//! surfaced); send failures do the same through their own variants so
//! callers can tell the two directions apart.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mail_parser::{MessageParser, MimeHeaders};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::MailConfig;
use crate::error::MailError;
use crate::model::{EmailAddress, EmailMessage};

/// An outgoing email.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub cc: Option<Vec<String>>,
    #[serde(default)]
    pub bcc: Option<Vec<String>>,
}

/// IMAP/SMTP mail service. Cheap to clone; holds only configuration.
#[derive(Clone)]
pub struct MailService {
    config: MailConfig,
}

impl MailService {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Fetch up to `limit` messages from `folder`, newest last.
    ///
    /// `unread_only` switches the IMAP search from ALL to UNSEEN.
    pub async fn fetch_emails(
        &self,
        folder: &str,
        limit: usize,
        unread_only: bool,
    ) -> Result<Vec<EmailMessage>, MailError> {
        let config = self.config.clone();
        let folder = folder.to_string();

        let result = tokio::task::spawn_blocking(move || {
            fetch_blocking(&config, &folder, limit, unread_only)
        })
        .await
        .map_err(|e| MailError::TaskJoin(e.to_string()))?;

        match &result {
            Ok(emails) => tracing::info!(count = emails.len(), "Fetched emails"),
            Err(e) => tracing::error!(error = %e, "Failed to fetch emails"),
        }
        result
    }

    /// Send an email via SMTP (STARTTLS relay).
    pub async fn send_email(&self, request: SendRequest) -> Result<(), MailError> {
        let config = self.config.clone();

        let result =
            tokio::task::spawn_blocking(move || send_blocking(&config, &request))
                .await
                .map_err(|e| MailError::TaskJoin(e.to_string()))?;

        match &result {
            Ok(()) => tracing::info!("Email sent successfully"),
            Err(e) => tracing::error!(error = %e, "Failed to send email"),
        }
        result
    }
}

// ── SMTP (blocking) ─────────────────────────────────────────────────

fn send_blocking(config: &MailConfig, request: &SendRequest) -> Result<(), MailError> {
    let mut builder = Message::builder()
        .from(config.email_address.parse().map_err(|e| {
            MailError::BuildMessage(format!("Invalid from address: {e}"))
        })?)
        .subject(&request.subject);

    for to in &request.to {
        builder = builder.to(to
            .parse()
            .map_err(|e| MailError::BuildMessage(format!("Invalid to address {to}: {e}")))?);
    }
    for cc in request.cc.iter().flatten() {
        builder = builder.cc(cc
            .parse()
            .map_err(|e| MailError::BuildMessage(format!("Invalid cc address {cc}: {e}")))?);
    }
    for bcc in request.bcc.iter().flatten() {
        builder = builder.bcc(bcc
            .parse()
            .map_err(|e| MailError::BuildMessage(format!("Invalid bcc address {bcc}: {e}")))?);
    }

    let email = match &request.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            request.body.clone(),
            html.clone(),
        )),
        None => builder.body(request.body.clone()),
    }
    .map_err(|e| MailError::BuildMessage(e.to_string()))?;

    let creds = Credentials::new(
        config.email_address.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::starttls_relay(&config.smtp_server)
        .map_err(|e| MailError::Send(format!("SMTP relay error: {e}")))?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    transport
        .send(&email)
        .map_err(|e| MailError::Send(e.to_string()))?;

    Ok(())
}

// ── IMAP (blocking) ─────────────────────────────────────────────────

trait ImapIo: Read + Write {}
impl<T: Read + Write> ImapIo for T {}

fn connect(config: &MailConfig) -> Result<Box<dyn ImapIo>, MailError> {
    let io_err = |reason: String| MailError::ImapConnect {
        host: config.imap_server.clone(),
        port: config.imap_port,
        reason,
    };

    let tcp = TcpStream::connect((&*config.imap_server, config.imap_port))
        .map_err(|e| io_err(e.to_string()))?;
    tcp.set_read_timeout(Some(Duration::from_secs(30)))
        .map_err(|e| io_err(e.to_string()))?;

    if !config.use_ssl {
        return Ok(Box::new(tcp));
    }

    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    );
    let server_name: rustls::pki_types::ServerName<'_> =
        rustls::pki_types::ServerName::try_from(config.imap_server.clone())
            .map_err(|e| io_err(e.to_string()))?;
    let conn = rustls::ClientConnection::new(tls_config, server_name)
        .map_err(|e| io_err(e.to_string()))?;

    Ok(Box::new(rustls::StreamOwned::new(conn, tcp)))
}

fn read_line(stream: &mut dyn ImapIo) -> std::io::Result<String> {
    let mut buf = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        match stream.read(&mut byte)? {
            0 => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "IMAP connection closed",
                ));
            }
            _ => {
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n") {
                    return Ok(String::from_utf8_lossy(&buf).to_string());
                }
            }
        }
    }
}

/// Send a tagged command and read lines until the tagged response arrives.
fn send_cmd(stream: &mut dyn ImapIo, tag: &str, cmd: &str) -> std::io::Result<Vec<String>> {
    let full = format!("{tag} {cmd}\r\n");
    stream.write_all(full.as_bytes())?;
    stream.flush()?;

    let mut lines = Vec::new();
    loop {
        let line = read_line(stream)?;
        let done = line.starts_with(tag);
        lines.push(line);
        if done {
            return Ok(lines);
        }
    }
}

/// Pull sequence numbers out of `* SEARCH n1 n2 ...` lines.
fn parse_search_ids(lines: &[String]) -> Vec<String> {
    let mut ids = Vec::new();
    for line in lines {
        if line.starts_with("* SEARCH") {
            ids.extend(
                line.split_whitespace()
                    .skip(2)
                    .map(|s| s.trim().to_string()),
            );
        }
    }
    ids
}

fn fetch_blocking(
    config: &MailConfig,
    folder: &str,
    limit: usize,
    unread_only: bool,
) -> Result<Vec<EmailMessage>, MailError> {
    let fetch_err = |reason: String| MailError::Fetch {
        folder: folder.to_string(),
        reason,
    };

    let mut stream = connect(config)?;

    let _greeting = read_line(stream.as_mut()).map_err(|e| fetch_err(e.to_string()))?;

    let login_resp = send_cmd(
        stream.as_mut(),
        "A1",
        &format!(
            "LOGIN \"{}\" \"{}\"",
            config.email_address,
            config.password.expose_secret()
        ),
    )
    .map_err(|e| fetch_err(e.to_string()))?;
    if !login_resp.last().is_some_and(|l| l.contains("OK")) {
        return Err(MailError::ImapAuth {
            user: config.email_address.clone(),
        });
    }

    let select_resp = send_cmd(stream.as_mut(), "A2", &format!("SELECT \"{folder}\""))
        .map_err(|e| fetch_err(e.to_string()))?;
    if !select_resp.last().is_some_and(|l| l.contains("OK")) {
        return Err(fetch_err(format!("SELECT {folder} failed")));
    }

    let criteria = if unread_only { "UNSEEN" } else { "ALL" };
    let search_resp = send_cmd(stream.as_mut(), "A3", &format!("SEARCH {criteria}"))
        .map_err(|e| fetch_err(e.to_string()))?;

    let ids = parse_search_ids(&search_resp);
    let start = ids.len().saturating_sub(limit);

    let mut emails = Vec::new();
    let mut tag_counter = 4_u32;

    for id in &ids[start..] {
        let tag = format!("A{tag_counter}");
        tag_counter += 1;
        let fetch_resp = send_cmd(stream.as_mut(), &tag, &format!("FETCH {id} RFC822"))
            .map_err(|e| fetch_err(e.to_string()))?;

        // Untagged FETCH line first, tagged OK last; the raw message is
        // everything in between.
        let raw: String = fetch_resp
            .iter()
            .skip(1)
            .take(fetch_resp.len().saturating_sub(2))
            .cloned()
            .collect();

        if let Some(parsed) = MessageParser::default().parse(raw.as_bytes()) {
            emails.push(parse_message(&parsed, id, folder));
        } else {
            tracing::warn!(id = %id, folder = %folder, "Skipping unparseable message");
        }
    }

    let logout_tag = format!("A{tag_counter}");
    let _ = send_cmd(stream.as_mut(), &logout_tag, "LOGOUT");

    Ok(emails)
}

// ── RFC822 → EmailMessage ───────────────────────────────────────────

fn convert_address(addr: &mail_parser::Addr) -> EmailAddress {
    EmailAddress {
        name: addr.name().map(str::to_string),
        email: addr
            .address()
            .map(str::to_string)
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

fn address_list(addresses: Option<&mail_parser::Address>) -> Vec<EmailAddress> {
    addresses
        .map(|list| list.iter().map(convert_address).collect())
        .unwrap_or_default()
}

fn convert_date(d: &mail_parser::DateTime) -> Option<DateTime<Utc>> {
    #[allow(clippy::cast_lossless)]
    let naive = chrono::NaiveDate::from_ymd_opt(d.year as i32, u32::from(d.month), u32::from(d.day))
        .and_then(|date| {
            date.and_hms_opt(u32::from(d.hour), u32::from(d.minute), u32::from(d.second))
        })?;
    Some(naive.and_utc())
}

/// Strip HTML tags from content (basic fallback when no text part exists).
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_message(parsed: &mail_parser::Message, id: &str, folder: &str) -> EmailMessage {
    let sender = parsed
        .from()
        .and_then(|a| a.first())
        .map(convert_address)
        .unwrap_or_else(|| EmailAddress::new("unknown"));

    let body = parsed
        .body_text(0)
        .map(|t| t.to_string())
        .or_else(|| parsed.body_html(0).map(|h| strip_html(h.as_ref())))
        .unwrap_or_default();

    let html_body = parsed.body_html(0).map(|h| h.to_string());

    let attachments = parsed
        .attachments()
        .filter_map(|part| MimeHeaders::attachment_name(part).map(str::to_string))
        .collect();

    EmailMessage {
        id: id.to_string(),
        subject: parsed.subject().unwrap_or_default().to_string(),
        sender,
        recipients: address_list(parsed.to()),
        cc: address_list(parsed.cc()),
        bcc: address_list(parsed.bcc()),
        body,
        html_body,
        date: parsed.date().and_then(convert_date),
        attachments,
        is_read: false,
        is_starred: false,
        folder: folder.to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_EMAIL: &str = "From: John Doe <john@example.com>\r\n\
        To: Jane <jane@example.com>, other@example.com\r\n\
        Cc: boss@example.com\r\n\
        Subject: Quarterly report\r\n\
        Date: Mon, 2 Jun 2025 10:30:00 +0000\r\n\
        Content-Type: text/plain\r\n\
        \r\n\
        Please find the report attached. Let me know if anything is missing.\r\n";

    #[test]
    fn parses_plain_text_message() {
        let parsed = MessageParser::default().parse(RAW_EMAIL.as_bytes()).unwrap();
        let email = parse_message(&parsed, "42", "INBOX");

        assert_eq!(email.id, "42");
        assert_eq!(email.subject, "Quarterly report");
        assert_eq!(email.sender.email, "john@example.com");
        assert_eq!(email.sender.name.as_deref(), Some("John Doe"));
        assert_eq!(email.recipients.len(), 2);
        assert_eq!(email.cc.len(), 1);
        assert!(email.body.starts_with("Please find the report"));
        assert_eq!(email.folder, "INBOX");

        let date = email.date.expect("date should parse");
        assert_eq!(date.to_rfc3339(), "2025-06-02T10:30:00+00:00");
    }

    #[test]
    fn html_only_message_falls_back_to_stripped_text() {
        let raw = "From: a@b.com\r\n\
            Subject: Hi\r\n\
            Content-Type: text/html\r\n\
            \r\n\
            <p>Hello <b>there</b></p>\r\n";
        let parsed = MessageParser::default().parse(raw.as_bytes()).unwrap();
        let email = parse_message(&parsed, "1", "INBOX");
        assert_eq!(email.body, "Hello there");
        assert!(email.html_body.is_some());
    }

    #[test]
    fn missing_date_is_none() {
        let raw = "From: a@b.com\r\nSubject: Hi\r\n\r\nBody text here\r\n";
        let parsed = MessageParser::default().parse(raw.as_bytes()).unwrap();
        let email = parse_message(&parsed, "1", "INBOX");
        assert!(email.date.is_none());
    }

    #[test]
    fn search_ids_parsed_from_untagged_line() {
        let lines = vec![
            "* SEARCH 3 7 12\r\n".to_string(),
            "A3 OK SEARCH completed\r\n".to_string(),
        ];
        assert_eq!(parse_search_ids(&lines), vec!["3", "7", "12"]);
    }

    #[test]
    fn empty_search_yields_no_ids() {
        let lines = vec![
            "* SEARCH\r\n".to_string(),
            "A3 OK SEARCH completed\r\n".to_string(),
        ];
        assert!(parse_search_ids(&lines).is_empty());
    }

    #[test]
    fn strip_html_basic() {
        assert_eq!(strip_html("<div><b>Bold</b> and <i>italic</i></div>"), "Bold and italic");
        assert_eq!(strip_html("No HTML here"), "No HTML here");
        assert_eq!(strip_html(""), "");
    }
}
