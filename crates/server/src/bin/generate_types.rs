//! Writes TypeScript declarations for the API payloads.
//!
//! Usage: `generate-types [OUTPUT]` (default `shared/types.ts`), or
//! `generate-types --check [OUTPUT]` to fail when the file is stale.

use std::{env, fs, path::PathBuf, process::ExitCode};

use db::models::{
    activity::{Activity, ActivityAction},
    board::{Board, BoardDetail, CreateBoard, ListWithCards, UpdateBoard},
    card::{Card, CreateCard, UpdateCard},
    list::{CreateList, List, UpdateList},
    user::{LoginUser, RegisterUser, User},
};
use server::routes::Deleted;
use services::services::{AuthSession, FieldError};
use ts_rs::TS;

const DEFAULT_OUTPUT: &str = "shared/types.ts";

fn generate() -> String {
    let decls = [
        User::decl(),
        RegisterUser::decl(),
        LoginUser::decl(),
        AuthSession::decl(),
        Board::decl(),
        CreateBoard::decl(),
        UpdateBoard::decl(),
        BoardDetail::decl(),
        ListWithCards::decl(),
        List::decl(),
        CreateList::decl(),
        UpdateList::decl(),
        Card::decl(),
        CreateCard::decl(),
        UpdateCard::decl(),
        ActivityAction::decl(),
        Activity::decl(),
        FieldError::decl(),
        Deleted::decl(),
    ];

    let mut out = String::from(
        "// This file was generated by `generate-types`. Do not edit it by hand.\n\n",
    );
    for decl in decls {
        out.push_str("export ");
        out.push_str(&decl);
        out.push_str("\n\n");
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1).peekable();
    let check = args.peek().is_some_and(|a| a == "--check");
    if check {
        args.next();
    }
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let generated = generate();

    if check {
        return match fs::read_to_string(&output) {
            Ok(existing) if existing == generated => {
                println!("{} is up to date", output.display());
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("{} is out of date; run generate-types", output.display());
                ExitCode::FAILURE
            }
        };
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("failed to create {}: {e}", parent.display());
            return ExitCode::FAILURE;
        }
    }

    match fs::write(&output, generated) {
        Ok(()) => {
            println!("wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to write {}: {e}", output.display());
            ExitCode::FAILURE
        }
    }
}
