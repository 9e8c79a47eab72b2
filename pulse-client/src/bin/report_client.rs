//! Interactive client for the PULSE gateway.
//!
//! Run with: cargo run --bin report_client -- 127.0.0.1:7100
//!
//! Type answers line by line; `photo:<file-id>` sends a photo attachment.

use pulse_client::PulseClient;
use pulse_core::{Prompt, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_prompts(prompts: &[Prompt]) {
    for prompt in prompts {
        println!("< {}", prompt.text);
        if let Some(keyboard) = &prompt.keyboard {
            for row in keyboard {
                println!("  [{}]", row.join("] ["));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7100".to_string());

    println!("Connecting to PULSE gateway at {addr}...");
    let mut client = PulseClient::connect(&addr, UserId(1001), "Демо Волонтёр").await?;

    print_prompts(&client.greet().await?);
    print_prompts(&client.begin().await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let prompts = if let Some(file_id) = line.strip_prefix("photo:") {
            client.send_photo(file_id).await?
        } else {
            client.send_text(line).await?
        };

        print_prompts(&prompts);
    }

    Ok(())
}
