//! Line-oriented terminal frontend for the vellum policy workbench.
//!
//! Pure rendering glue: it translates typed commands into session
//! operations and prints snapshots back. All policy state lives in the
//! session; this binary owns none.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use url::Url;
use vellum_client::{HttpPolicyService, NewPolicyDraft, PolicyKind};
use vellum_workbench::{PolicyId, Session, ValidationStatus};

#[derive(Debug, Parser)]
#[command(name = "vellum", about = "Edit and validate policies held by a remote policy service")]
struct Cli {
	/// Base URL of the policy service.
	#[arg(long, env = "VELLUM_SERVICE_URL", default_value = "http://localhost:8090/")]
	service_url: Url,

	/// Log filter in tracing `EnvFilter` syntax.
	#[arg(long, env = "VELLUM_LOG", default_value = "warn")]
	log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_new(&cli.log).context("invalid log filter")?,
		)
		.with_writer(std::io::stderr)
		.init();

	let http = Arc::new(HttpPolicyService::new(cli.service_url));
	let mut session = Session::new(http.clone());

	if let Err(err) = session.refresh_policies().await {
		eprintln!("could not reach policy service: {err}");
	}

	repl(&mut session, &http).await
}

async fn repl(session: &mut Session, http: &HttpPolicyService) -> anyhow::Result<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	println!("vellum policy workbench; type `help` for commands");

	loop {
		session.drain_events();
		prompt(session)?;

		let Some(line) = lines.next_line().await? else {
			return Ok(());
		};
		let line = line.trim();
		let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

		match command {
			"" => {}
			"help" => print_help(),
			"list" => {
				for id in session.registry().ids() {
					let marker = if session.registry().selected() == Some(id) {
						"*"
					} else {
						" "
					};
					println!("{marker} {id}");
				}
			}
			"select" => {
				if rest.is_empty() {
					println!("usage: select <id>");
				} else if let Err(err) = session.select(PolicyId::from(rest)).await {
					println!("select failed: {err}");
				}
			}
			"show" => println!("{}", session.buffer().text()),
			"edit" => {
				let text = read_body(&mut lines).await?;
				session.note_edit(text);
				println!("buffer updated; validation in flight");
			}
			"status" => println!("{}", status_line(session.validation_status())),
			"new" => match parse_draft(rest) {
				Some(draft) => match session.create_policy(&draft).await {
					Ok(id) => println!("created {id}"),
					Err(err) => println!("create failed: {err}"),
				},
				None => println!("usage: new <resource|principal|derivedRole> <name> [version] [scope]"),
			},
			"save" => {
				if session.snapshot().can_save {
					match session.save().await {
						Ok(id) => println!("saved as {id}"),
						Err(err) => println!("save failed: {err}"),
					}
				} else {
					println!("save disabled: {}", status_line(session.validation_status()));
				}
			}
			"audit" => match http.fetch_audit_log().await {
				Ok(log) => print!("{log}"),
				Err(err) => println!("audit log unavailable: {err}"),
			},
			"quit" | "exit" => return Ok(()),
			other => println!("unknown command: {other} (try `help`)"),
		}
	}
}

fn prompt(session: &Session) -> anyhow::Result<()> {
	let selected = session
		.registry()
		.selected()
		.map_or_else(|| "-".to_string(), ToString::to_string);
	print!("[{selected}]> ");
	std::io::stdout().flush()?;
	Ok(())
}

/// Read buffer text line by line until a lone `.`.
async fn read_body(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<String> {
	println!("enter policy text, finish with a single `.` on its own line:");
	let mut body = String::new();
	while let Some(line) = lines.next_line().await? {
		if line == "." {
			break;
		}
		body.push_str(&line);
		body.push('\n');
	}
	Ok(body)
}

fn status_line(status: &ValidationStatus) -> String {
	match status {
		ValidationStatus::Valid => "policy valid".to_string(),
		ValidationStatus::Invalid { detail } => format!("policy invalid: {detail}"),
	}
}

fn parse_draft(rest: &str) -> Option<NewPolicyDraft> {
	let mut parts = rest.split_whitespace();
	let kind = match parts.next()? {
		"resource" => PolicyKind::Resource,
		"principal" => PolicyKind::Principal,
		"derivedRole" | "derived-role" => PolicyKind::DerivedRole,
		_ => return None,
	};
	let name = parts.next()?.to_string();
	let version = parts.next().unwrap_or_default().to_string();
	let scope = parts.next().unwrap_or_default().to_string();
	Some(NewPolicyDraft {
		policy_kind: kind,
		name,
		version,
		scope,
	})
}

fn print_help() {
	println!("commands:");
	println!("  list                  known policies (* marks the selection)");
	println!("  select <id>           switch to a policy, discarding unsaved edits");
	println!("  show                  print the buffer");
	println!("  edit                  replace the buffer (terminate with `.`)");
	println!("  status                last confirmed validation result");
	println!("  new <kind> <name> [version] [scope]   create a policy");
	println!("  save                  store the buffer (requires valid status)");
	println!("  audit                 recent access log entries");
	println!("  quit                  leave");
}
