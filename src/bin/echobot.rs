/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use jabbot::Element;
use jabbot::Jid;
use jabbot::Session;
use jabbot::SessionBuilder;
use jabbot::SessionHandler;
use jabbot::SessionState;

const POLL_INTERVAL: Duration = Duration::from_secs(60);

fn print_version() {
    println!("echobot (jabbot) v{}", jabbot::VERSION);
}

fn print_usage() {
    println!(concat!(
        "Usage: echobot [OPTIONS]\n",
        "This bot sends every chat message back to its sender.\n",
        "Options:\n",
        "  -j, --jid <JID>        Jabber ID of the bot account\n",
        "  -s, --server <HOST>    Server to connect (default: JID domain)\n",
        "  -p, --password <PASS>  Account password (prompted if missing)\n",
        "  -h, --help             Display this help message and exit\n",
        "  -v, --version          Display the version and exit\n",
        "Log verbosity is controlled with the RUST_LOG variable."
    ));
}

struct EchoBot;

impl SessionHandler for EchoBot {
    fn handle_message(&mut self, session: &Session, from: &str, body: &str) {
        // Chat states and receipts come without a body
        if body.is_empty() {
            return;
        }
        println!("Got message from {from}\n{body}");
        if let Err(err) = session.message(from, body) {
            eprintln!("Error: {err}");
        }
    }

    fn handle_logged_in(&mut self, session: &Session) {
        println!("Logged in as {}", session.jid());
    }

    fn handle_auth_failed(&mut self, _session: &Session, failure: &Element) {
        eprintln!("Error: login failed: {failure}");
    }

    fn handle_stream_error(&mut self, _session: &Session, error: &Element) {
        eprintln!("Error: stream error: {error}");
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args();
    let mut jid: Option<Jid> = None;
    let mut server: Option<String> = None;
    let mut password: Option<String> = None;

    // Skip the first argument (program name)
    args.next();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-j" | "--jid" => {
                let Some(value) = args.next() else {
                    eprintln!("Error: Jabber ID expected after {arg}");
                    return ExitCode::FAILURE;
                };
                jid = match Jid::new(&value) {
                    Ok(jid) => Some(jid),
                    Err(err) => {
                        eprintln!("Error: {err}");
                        return ExitCode::FAILURE;
                    }
                };
            }
            "-s" | "--server" => {
                let Some(value) = args.next() else {
                    eprintln!("Error: Server name expected after {arg}");
                    return ExitCode::FAILURE;
                };
                server = Some(value);
            }
            "-p" | "--password" => {
                let Some(value) = args.next() else {
                    eprintln!("Error: Password expected after {arg}");
                    return ExitCode::FAILURE;
                };
                password = Some(value);
            }
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Error: Unknown option {arg}");
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(jid) = jid else {
        eprintln!("Error: Jabber ID is required, see --help");
        return ExitCode::FAILURE;
    };
    let password = match password {
        Some(password) => password,
        None => match rpassword::prompt_password("Password: ") {
            Ok(password) => password,
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let session = match SessionBuilder::new(jid)
        .server(server)
        .password(&password)
        .connect(EchoBot)
    {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    while !session.wait_for_state(SessionState::Closed, POLL_INTERVAL) {
        if session.state() == SessionState::AuthFailed {
            if let Err(err) = session.close() {
                eprintln!("Error: {err}");
            }
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
