// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use minepulse_lib::auth::challenge_message;
use std::error::Error;

/// Config snippet for a credential, the signature left for the wallet to fill in
fn config_snippet(address: &str, message: &str) -> String {
    // TOML basic strings need the newlines escaped
    let escaped = message.replace('\n', "\\n");
    format!(
        "[wallet]\naddress = \"{address}\"\nsignature = \"<signature from wallet>\"\nmessage = \"{escaped}\""
    )
}

pub fn execute(address: &str, now: DateTime<Utc>) -> Result<(), Box<dyn Error>> {
    if !address.starts_with("0x") {
        return Err(format!("Wallet address must be 0x prefixed, got {address}").into());
    }
    let address = address.to_lowercase();
    let message = challenge_message(&address, now.timestamp());

    println!("\n=== Sign this message with your wallet ===\n");
    println!("{message}");
    println!("\n=== Add to config.toml ===\n");
    println!("{}", config_snippet(&address, &message));
    println!();

    Ok(())
}
