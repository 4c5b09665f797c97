// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .short('t')
        .required(required)
        .value_parser(["income", "expense"])
        .help("income | expense")
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .version(clap::crate_version!())
        .about("Offline-first income/expense tracker with cloud backup")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("init").about("Create the local stores"))
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    Command::new("add")
                        .arg(type_arg(true))
                        .arg(Arg::new("amount").long("amount").short('a').required(true))
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .short('d')
                                .help("YYYY-MM-DD or ISO-8601; defaults to now"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(type_arg(false))
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("search").long("search").short('s')),
                ))
                .subcommand(json_args(
                    Command::new("show").arg(Arg::new("id").required(true)),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").required(true))
                        .arg(type_arg(false))
                        .arg(Arg::new("amount").long("amount").short('a'))
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(Arg::new("date").long("date").short('d')),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(json_args(
            Command::new("summary").about("Income, expenses and balance"),
        ))
        .subcommand(json_args(
            Command::new("pending").about("What still needs backing up"),
        ))
        .subcommand(json_args(
            Command::new("sync").about("Back up local changes to the cloud"),
        ))
        .subcommand(json_args(
            Command::new("restore").about("Merge the cloud copy into local data"),
        ))
        .subcommand(
            Command::new("profile")
                .about("Display name, avatar and currency")
                .subcommand(json_args(Command::new("show")))
                .subcommand(Command::new("set-name").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("set-image").arg(Arg::new("path").required(true)))
                .subcommand(
                    Command::new("set-currency").arg(Arg::new("currency").required(true)),
                ),
        )
}
