use std::io;
use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;

use voxsh_config::AppConfig;
use voxsh_runtime::{FeedbackSink, Outcome, Pipeline, SpeechInput};

/// Line prompt standing in for the speech recognizer: one line is one
/// utterance.  End of input is reported as absence.
struct LinePrompt;

#[async_trait]
impl SpeechInput for LinePrompt {
    async fn listen(&mut self) -> Result<Option<String>> {
        print!("🎤 ");
        io::stdout().flush()?;
        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Console stand-in for the TTS collaborator.
struct ConsoleFeedback;

#[async_trait]
impl FeedbackSink for ConsoleFeedback {
    async fn speak(&mut self, text: &str) -> Result<bool> {
        println!("🔊 {text}");
        Ok(true)
    }
}

pub(crate) async fn run_session(config: &AppConfig) -> Result<()> {
    println!("{} — natural-language shell", config.agent.name);
    println!("type an utterance, or: help, templates, exit");

    let mut pipeline = Pipeline::from_config(config);
    let mut input = LinePrompt;
    let mut feedback = ConsoleFeedback;

    loop {
        let Some(line) = input.listen().await? else {
            println!("session closed");
            break;
        };

        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "exit" | "quit" | "退出" | "離開" => {
                println!("session closed");
                break;
            }
            "help" => {
                show_help();
                continue;
            }
            "templates" => {
                for (key, description) in pipeline.matcher().supported_templates() {
                    println!("{:<20} {}", key.as_str(), description);
                }
                continue;
            }
            _ => {}
        }

        let outcome = pipeline.handle(&line).await;
        if let Outcome::Done { result, .. } | Outcome::Failed { result, .. } = &outcome {
            if !result.stdout.is_empty() {
                println!("{}", result.stdout);
            }
        }
        pipeline.deliver(&mut feedback, &outcome).await;
    }

    Ok(())
}

fn show_help() {
    println!(
        "examples:
  建立一個叫做 docs 的資料夾     create a folder called docs
  列出目錄內容                  list files
  顯示目前目錄                  show the current directory
  跳到 docs                     change into docs
  複製 a.txt 到 backup          copy a.txt to backup
  check disk usage
  show system info

control words: help, templates, exit"
    );
}
