// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories::taxonomy;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let options = taxonomy().flatten();
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &options)? {
        return Ok(());
    }

    let data = options
        .iter()
        .map(|o| {
            let restricted = taxonomy()
                .node(o.id)
                .map(|n| {
                    n.network_restrictions
                        .iter()
                        .map(|net| format!("{:?}", net))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            vec![
                format!("{}{}", "  ".repeat(o.depth), o.label),
                o.id.to_string(),
                restricted,
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Id", "Networks"], data));
    Ok(())
}
