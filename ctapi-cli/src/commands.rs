use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use ctapi::{
    ConnectionHandle, CtClient, ListDataKind, ListHandle, TagHandle, TagValue, c_buffer_to_string,
    friendly_error_hint, is_library_error, to_library_error,
};

use crate::cli::Command;

/// Connection settings taken from the command line.
#[derive(Debug, Clone)]
pub struct Session {
    pub host: String,
    pub user: String,
    pub password: String,
    pub mode: u32,
    pub buffer_size: usize,
}

/// Human-readable form of a last-error value.
pub fn describe_code(code: u32) -> String {
    let base = if is_library_error(code) {
        format!("CtAPI error {}", to_library_error(code))
    } else {
        format!("error {code}")
    };
    match friendly_error_hint(code) {
        Some(hint) => format!("{base} ({hint})"),
        None => base,
    }
}

/// Reads the last error right after a failed native call.
fn native_failure(client: &dyn CtClient, operation: &str) -> anyhow::Error {
    let code = client.last_error();
    tracing::warn!(operation, code, "CtAPI call failed");
    anyhow!("{operation} failed: {}", describe_code(code))
}

/// `explain`: decode without loading anything.
pub fn explain(code: u32, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "0x{code:08X} = {}", describe_code(code))?;
    Ok(())
}

/// Opens a session, runs `command`, and always closes the session.
pub fn run(
    client: &dyn CtClient,
    session: &Session,
    command: &Command,
    out: &mut dyn Write,
) -> Result<()> {
    let span = tracing::info_span!("ctapi.session", host = %session.host, mode = session.mode);
    let _enter = span.enter();

    let conn = client
        .open_with_mode(
            &session.host,
            &session.user,
            &session.password,
            session.mode,
        )
        .context("Invalid connection settings")?;
    if conn.is_null() {
        return Err(native_failure(client, "ctOpen"));
    }
    tracing::info!("Connected");

    let result = dispatch(client, conn, session, command, out);

    if !client.close(conn) {
        let err = native_failure(client, "ctClose");
        tracing::warn!(error = %err, "Session close failed");
    }
    result
}

fn dispatch(
    client: &dyn CtClient,
    conn: ConnectionHandle,
    session: &Session,
    command: &Command,
    out: &mut dyn Write,
) -> Result<()> {
    let mut buffer = vec![0u8; session.buffer_size];
    match command {
        Command::Read { tag } => {
            if !client.tag_read(conn, tag, &mut buffer)? {
                return Err(native_failure(client, "ctTagRead"));
            }
            writeln!(out, "{tag} = {}", c_buffer_to_string(&buffer))?;
        }
        Command::Write { tag, value } => {
            if !client.tag_write(conn, tag, &TagValue::from(value.as_str()))? {
                return Err(native_failure(client, "ctTagWrite"));
            }
            writeln!(out, "{tag} <- {value}")?;
        }
        Command::Cicode { expression } => {
            if !client.run_script(conn, expression, &mut buffer, None, None)? {
                return Err(native_failure(client, "ctCicode"));
            }
            writeln!(out, "{}", c_buffer_to_string(&buffer))?;
        }
        Command::Poll {
            kind,
            lightweight,
            tags,
        } => poll(
            client,
            conn,
            tags,
            Command::list_mode(*lightweight),
            (*kind).into(),
            &mut buffer,
            out,
        )?,
        Command::Explain { .. } => bail!("explain does not open a session"),
    }
    Ok(())
}

fn poll(
    client: &dyn CtClient,
    conn: ConnectionHandle,
    tags: &[String],
    list_mode: u32,
    kind: ListDataKind,
    buffer: &mut [u8],
    out: &mut dyn Write,
) -> Result<()> {
    let list = client.list_new(conn, list_mode);
    if list.is_null() {
        return Err(native_failure(client, "ctListNew"));
    }

    let mut members = Vec::with_capacity(tags.len());
    let mut outcome = Ok(());
    for tag in tags {
        match client.list_add(list, tag) {
            Ok(handle) if !handle.is_null() => members.push((tag, handle)),
            Ok(_) => {
                outcome = Err(native_failure(client, &format!("ctListAdd({tag})")));
                break;
            }
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        }
    }

    if outcome.is_ok() {
        outcome = read_members(client, list, &members, kind, buffer, out);
    }

    for (tag, handle) in &members {
        if !client.list_delete(*handle) {
            tracing::warn!(tag = %tag, "ctListDelete failed");
        }
    }
    if !client.list_free(list) {
        tracing::warn!("ctListFree failed");
    }
    outcome
}

fn read_members(
    client: &dyn CtClient,
    list: ListHandle,
    members: &[(&String, TagHandle)],
    kind: ListDataKind,
    buffer: &mut [u8],
    out: &mut dyn Write,
) -> Result<()> {
    if !client.list_read(list, None) {
        return Err(native_failure(client, "ctListRead"));
    }
    for (tag, handle) in members {
        buffer.fill(0);
        if client.list_data_with_mode(*handle, buffer, kind)? {
            writeln!(out, "{tag} = {}", c_buffer_to_string(buffer))?;
        } else {
            let err = native_failure(client, "ctListData");
            writeln!(out, "{tag} = <{err}>")?;
        }
    }
    Ok(())
}
