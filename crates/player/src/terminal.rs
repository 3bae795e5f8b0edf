//! The UI collaborator interface of §6, implemented over stdin/stdout:
//! `show_actions(choices) -> index`, `show_narration(text)`, `show_error(text)`.

use std::io::Write;

use wrldbldr_domain::ActionChoice;

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("failed to read from stdin: {0}")]
    Read(#[from] std::io::Error),
    #[error("stdin closed before a choice was made")]
    Eof,
}

/// Prints the offered choices (plus the implicit leave option at the last
/// index, matching the engine's `InteractionLoop::choose` convention) and
/// blocks on stdin until the player enters a valid index.
pub fn show_actions(choices: &[ActionChoice]) -> Result<usize, TerminalError> {
    println!();
    for (i, choice) in choices.iter().enumerate() {
        println!("  [{i}] {} (skill: {}, difficulty: {})", choice.action_text(), choice.related_skill(), choice.difficulty());
    }
    let leave_index = choices.len();
    println!("  [{leave_index}] Leave");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            return Err(TerminalError::Eof);
        }

        match line.trim().parse::<usize>() {
            Ok(index) if index <= leave_index => return Ok(index),
            _ => println!("enter a number from 0 to {leave_index}"),
        }
    }
}

pub fn show_narration(text: &str) {
    println!("\n{text}");
}

/// Prints the error and blocks for acknowledgement, matching the
/// `show_error(text) -> future<acknowledged>` contract of §6.
pub fn show_error(kind: &str, message: &str) -> Result<(), TerminalError> {
    println!("\n[{kind}] {message}");
    print!("press enter to continue... ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}
