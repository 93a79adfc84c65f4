#![forbid(unsafe_code)]
//! Walk through the ledger lifecycle: queue transactions, seal blocks, mine
//! one for real and check the result.

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use hashledger::blockchain::{Block, Blockchain};
use hashledger::crypto::generate_node_identifier;
use std::time::Instant;

fn short_hash(hash: &str) -> String {
    if hash.len() > 24 {
        format!("{}...{}", &hash[..12], &hash[hash.len() - 8..])
    } else {
        hash.to_string()
    }
}

fn chain_table(blocks: &[Block]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Index").add_attribute(Attribute::Bold),
            Cell::new("Proof").add_attribute(Attribute::Bold),
            Cell::new("Previous Hash").add_attribute(Attribute::Bold),
            Cell::new("Hash").add_attribute(Attribute::Bold),
            Cell::new("Transactions").add_attribute(Attribute::Bold),
        ]);

    for block in blocks {
        let transactions = block
            .transactions
            .iter()
            .map(|tx| format!("{} -> {}: {}", tx.sender, tx.recipient, tx.amount))
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            Cell::new(format!("#{}", block.index)).fg(TableColor::Cyan),
            Cell::new(block.proof),
            Cell::new(short_hash(&block.previous_hash)),
            Cell::new(short_hash(&block.hash())).fg(TableColor::Green),
            Cell::new(if transactions.is_empty() { "-".to_string() } else { transactions }),
        ]);
    }

    table
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "hashledger walkthrough".bright_cyan().bold());
    println!("{}", "----------------------".bright_cyan());

    let mut blockchain = Blockchain::new();

    let next = blockchain.new_transaction("Satoshi", "Mike", "5 BTC");
    blockchain.new_transaction("Mike", "Satoshi", "1 BTC");
    blockchain.new_transaction("Satoshi", "Hal Finney", "5 BTC");
    println!("Queued 3 transactions for block {}", next.to_string().bright_yellow());
    blockchain.new_block(12345, None);

    let next = blockchain.new_transaction("Mike", "Alice", "1 BTC");
    blockchain.new_transaction("Alice", "Bob", "0.5 BTC");
    blockchain.new_transaction("Bob", "Mike", "0.5 BTC");
    println!("Queued 3 transactions for block {}", next.to_string().bright_yellow());
    blockchain.new_block(6789, None);

    let miner = generate_node_identifier();
    println!("Mining a block for {}...", miner.bright_white());
    let start_time = Instant::now();
    let mined = blockchain.mine(&miner).clone();
    println!(
        "{} block #{} with proof {} in {:.3}s",
        "Forged".bright_green().bold(),
        mined.index,
        mined.proof,
        start_time.elapsed().as_secs_f64()
    );

    println!();
    println!("{}", chain_table(blockchain.chain()));
    println!();

    // Blocks 2 and 3 carry hand-picked proofs, so the audit is expected to
    // flag the first of them.
    match blockchain.validate() {
        Ok(()) => println!("{}", "Chain integrity: valid".bright_green()),
        Err(e) => println!("{} {}", "Chain integrity:".yellow(), e.to_string().yellow()),
    }

    Ok(())
}
