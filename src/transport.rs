// ---------------------------------------------------------------------------
// NDJSON transport: one JSON-RPC response object per line
// ---------------------------------------------------------------------------
//
// Writes to stdout in the engine binary and to any `Write` in tests. Engine
// errors are mapped to their JSON-RPC code here so handlers only ever return
// `EngineError`.
// ---------------------------------------------------------------------------

use std::io::{self, Write};

use serde::Serialize;

use crate::error::EngineError;
use crate::protocol::{ENGINE_ERROR, INVALID_PARAMS};

#[derive(Serialize)]
struct Response<'a> {
	jsonrpc: &'static str,
	id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<&'a serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<ErrorBody<'a>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
	code: i32,
	message: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

pub struct NdjsonTransport<W: Write = io::Stdout> {
	writer: W,
}

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	pub fn new() -> Self {
		Self::with_writer(io::stdout())
	}
}

impl<W: Write> NdjsonTransport<W> {
	pub fn with_writer(writer: W) -> Self {
		Self { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}

	pub fn write_response(&mut self, id: u64, result: serde_json::Value) {
		self.write_line(&Response {
			jsonrpc: "2.0",
			id,
			result: Some(&result),
			error: None,
		});
	}

	pub fn write_error(
		&mut self,
		id: u64,
		code: i32,
		message: &str,
		data: Option<serde_json::Value>,
	) {
		self.write_line(&Response {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(ErrorBody {
				code,
				message,
				data,
			}),
		});
	}

	/// Parameter decoding failures answer `INVALID_PARAMS`; everything else
	/// is a domain failure carrying `{code, message}` as data.
	pub fn write_engine_error(&mut self, id: u64, err: &EngineError) {
		let code = match err {
			EngineError::InvalidParams(_) => INVALID_PARAMS,
			_ => ENGINE_ERROR,
		};
		self.write_error(id, code, &err.to_string(), Some(err.to_json_rpc_error()));
	}

	fn write_line(&mut self, value: &impl Serialize) {
		let line = match serde_json::to_string(value) {
			Ok(line) => line,
			Err(e) => {
				tracing::error!("Failed to serialize response: {}", e);
				return;
			}
		};
		if let Err(e) = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush()) {
			tracing::error!("Failed to write response: {}", e);
		}
	}
}
