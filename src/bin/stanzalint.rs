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
use std::fs::File;
use std::io::Read;
use std::io::stdin;
use std::process::ExitCode;

use jabbot::ParseError;
use jabbot::StanzaParser;
use jabbot::StreamElement;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

fn print_version() {
    println!("stanzalint (jabbot) v{}", jabbot::VERSION);
}

fn print_usage() {
    println!(
        concat!(
            "Usage: stanzalint [OPTIONS] [FILE.xml...]\n",
            "This tool splits XMPP stream dumps into stanzas and checks them.\n",
            "Options:\n",
            "  -c, --compact        Print stanzas on a single line\n",
            "  -q, --quiet          Only report errors and the stanza count\n",
            "  -b, --buffer <SIZE>  Read chunk size in bytes (default: {})\n",
            "  -h, --help           Display this help message and exit\n",
            "  -v, --version        Display the version and exit\n",
        ),
        DEFAULT_BUFFER_SIZE
    );
}

enum LinterError {
    IoError(std::io::Error),
    ParseError(ParseError),
}

impl From<std::io::Error> for LinterError {
    fn from(err: std::io::Error) -> Self {
        LinterError::IoError(err)
    }
}

impl From<ParseError> for LinterError {
    fn from(err: ParseError) -> Self {
        LinterError::ParseError(err)
    }
}

struct Linter {
    parser: StanzaParser,
    buffer_size: usize,
    compact: bool,
    quiet: bool,
    nr_stanzas: usize,
}

impl Linter {
    fn new(buffer_size: usize, compact: bool, quiet: bool) -> Self {
        Linter {
            parser: StanzaParser::new(),
            buffer_size,
            compact,
            quiet,
            nr_stanzas: 0,
        }
    }

    fn print_stanzas(&mut self) {
        while let Some(item) = self.parser.pop() {
            match item {
                StreamElement::Element(stanza) => {
                    self.nr_stanzas += 1;
                    if self.quiet {
                        continue;
                    }
                    if self.compact {
                        println!("{stanza}");
                    } else {
                        print!("{}", stanza.pretty());
                    }
                }
                StreamElement::End => {
                    if !self.quiet {
                        println!("</stream:stream>");
                    }
                }
            }
        }
    }

    fn parse_file(&mut self, file: &str, is_stream: bool) -> Result<(), LinterError> {
        let mut f: Box<dyn Read> = if is_stream {
            Box::new(stdin())
        } else {
            Box::new(File::open(file)?)
        };
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let bytes_read = f.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            let result = self.parser.feed_bytes(&buffer[..bytes_read]);
            self.print_stanzas();
            result?;
        }
        Ok(())
    }

    fn lint_file(&mut self, file: &str, is_stream: bool) -> bool {
        self.parser.reset();
        self.nr_stanzas = 0;
        let result = self.parse_file(file, is_stream);
        match result {
            Ok(()) => {
                if self.quiet {
                    println!("{}: {} stanzas", file, self.nr_stanzas);
                }
                true
            }
            Err(LinterError::IoError(e)) => {
                eprintln!("Error reading file '{}': {}", file, e);
                false
            }
            Err(LinterError::ParseError(e)) => {
                let location = self.parser.location();
                eprintln!(
                    "Syntax error in file '{}' at line {} column {}: {}",
                    file, location.lines, location.column, e
                );
                false
            }
        }
    }
}

fn main() -> ExitCode {
    #[cfg(feature = "xmpp")]
    env_logger::init();

    let mut args = env::args();

    let mut files = Vec::new();
    let mut compact = false;
    let mut quiet = false;
    let mut buffer_size = DEFAULT_BUFFER_SIZE;

    // Skip the first argument (program name)
    args.next();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--compact" => {
                compact = true;
            }
            "-q" | "--quiet" => {
                quiet = true;
            }
            "-b" | "--buffer" => {
                if let Some(size) = args.next() {
                    match size.parse::<usize>() {
                        Ok(size) if size > 0 => buffer_size = size,
                        _ => {
                            eprintln!("Invalid buffer size");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    eprintln!("Missing buffer size");
                    return ExitCode::FAILURE;
                }
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
                files.push(arg);
            }
        }
    }

    let mut linter = Linter::new(buffer_size, compact, quiet);
    if files.is_empty() {
        if !linter.lint_file("stdin", true) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in files {
            if !linter.lint_file(&file, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
