use std::io::Write;

use learn_core::model::{OptionLetter, QuizId};
use services::AssessmentService;
use tokio::io::{AsyncBufReadExt, BufReader};
use ui::vm::{AssessmentIntent, AssessmentOutcome, AssessmentVm, QuestionVm, ResultsVm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Intent(AssessmentIntent),
    Show,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Some(Input::Show);
    };
    let word = word.to_ascii_lowercase();
    let input = match word.as_str() {
        "next" | ">" => Input::Intent(AssessmentIntent::Next),
        "prev" | "<" => Input::Intent(AssessmentIntent::Previous),
        "go" => {
            let number: usize = words.next()?.parse().ok()?;
            Input::Intent(AssessmentIntent::GoTo(number.checked_sub(1)?))
        }
        "mark" => Input::Intent(AssessmentIntent::ToggleBookmark),
        "submit" => Input::Intent(AssessmentIntent::RequestSubmit),
        "yes" => Input::Intent(AssessmentIntent::ConfirmSubmit),
        "no" => Input::Intent(AssessmentIntent::CancelSubmit),
        "retry" => Input::Intent(AssessmentIntent::Retry),
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" => Input::Quit,
        single if single.chars().count() == 1 => {
            Input::Intent(AssessmentIntent::Select(OptionLetter::parse(single).ok()?))
        }
        _ => return None,
    };
    Some(input)
}

fn print_help() {
    println!("  a, b, c ...   choose an option");
    println!("  next / prev   next / previous question (or > / <)");
    println!("  go <number>   jump to a question");
    println!("  mark          bookmark this question");
    println!("  submit        finish the quiz");
    println!("  yes / no      confirm or cancel submitting");
    println!("  retry         try saving again after a failure");
    println!("  quit          leave without submitting");
}

fn render(screen: &QuestionVm) {
    println!();
    let timer = screen
        .timer_label
        .as_deref()
        .map(|t| format!("  [{t}{}]", if screen.timer_urgent { " !" } else { "" }))
        .unwrap_or_default();
    let mark = if screen.bookmarked { "  *bookmarked*" } else { "" };
    println!("Question {}{timer}{mark}", screen.progress_label);
    println!("{}", screen.text);
    for option in &screen.options {
        let chosen = if option.selected { ">" } else { " " };
        println!(" {chosen} {}. {}", option.letter, option.text);
    }
    println!("({})", screen.answered_label);
    if let Some(prompt) = &screen.prompt {
        println!();
        println!("{} {}", prompt.title, prompt.message);
        if prompt.can_cancel {
            println!("Type 'yes' to submit or 'no' to keep going.");
        }
    }
}

fn render_results(results: &ResultsVm) {
    println!();
    println!("{} You scored {}.", results.headline, results.score_label);
    println!(
        "Correct: {}  Incorrect: {} (unanswered: {})  Total: {}",
        results.correct, results.incorrect, results.unanswered, results.total
    );
    if let Some(time) = &results.time_taken_label {
        println!("Time taken: {time}");
    }
    for line in &results.review {
        let mark = if line.is_correct { "ok" } else { "x " };
        println!(
            "  [{mark}] {}. {}  you: {}  answer: {}",
            line.number, line.question, line.your_answer, line.correct_answer
        );
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Interactive attempt on stdin/stdout. Returns the results once saved.
pub async fn run_quiz(
    service: &AssessmentService,
    quiz_id: QuizId,
) -> Result<Option<ResultsVm>, Box<dyn std::error::Error>> {
    let mut vm = AssessmentVm::open(service, quiz_id).await;
    if let Some(err) = vm.error() {
        eprintln!("{}", err.message());
        return Ok(None);
    }

    if let Some(title) = vm.quiz_title() {
        println!("{title}");
    }
    println!("Type 'help' for commands.");
    if let Some(screen) = vm.question() {
        render(&screen);
    }
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut timers_live = true;

    loop {
        let outcome = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    vm.leave();
                    return Ok(None);
                };
                match parse_input(&line) {
                    Some(Input::Intent(intent)) => match vm.handle(intent).await {
                        Ok(outcome) => {
                            // Submitting stops the countdown; re-arm the select branch.
                            timers_live = true;
                            outcome
                        }
                        Err(err) => {
                            println!("{}", err.message());
                            prompt();
                            continue;
                        }
                    },
                    Some(Input::Show) => AssessmentOutcome::Continue,
                    Some(Input::Help) => {
                        print_help();
                        prompt();
                        continue;
                    }
                    Some(Input::Quit) => {
                        vm.leave();
                        println!("Left the quiz. Nothing was submitted.");
                        return Ok(None);
                    }
                    None => {
                        println!("Unknown command. Type 'help'.");
                        prompt();
                        continue;
                    }
                }
            }
            event = vm.next_timer(), if timers_live => {
                let Some(event) = event else {
                    timers_live = false;
                    continue;
                };
                let before = vm.question();
                let outcome = match vm.apply_timer(event).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::warn!("timer event rejected: {err:?}");
                        continue;
                    }
                };
                let after = vm.question();
                let had_prompt = before.as_ref().map(|s| s.prompt.is_some());
                let has_prompt = after.as_ref().map(|s| s.prompt.is_some());
                let prompt_changed = had_prompt != has_prompt;
                if outcome == AssessmentOutcome::Continue && !prompt_changed {
                    // Only the final minute is announced between redraws.
                    if let Some(screen) = after.filter(|s| s.timer_urgent) {
                        if before.and_then(|s| s.timer_label) != screen.timer_label {
                            if let Some(label) = screen.timer_label {
                                println!("  {label} left");
                            }
                        }
                    }
                    continue;
                }
                outcome
            }
        };

        match outcome {
            AssessmentOutcome::Continue => {
                if let Some(screen) = vm.question() {
                    render(&screen);
                }
            }
            AssessmentOutcome::SubmissionFailed { message } => {
                println!("Could not save your result: {message}");
                println!("Type 'retry' to try again. Your answers are kept.");
            }
            AssessmentOutcome::Completed(results) => {
                render_results(&results);
                return Ok(Some(results));
            }
        }
        prompt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!(
            parse_input(" B "),
            Some(Input::Intent(AssessmentIntent::Select(
                OptionLetter::parse("b").unwrap()
            )))
        );
    }

    #[test]
    fn go_is_one_based() {
        assert_eq!(
            parse_input("go 3"),
            Some(Input::Intent(AssessmentIntent::GoTo(2)))
        );
        assert_eq!(parse_input("go 0"), None);
        assert_eq!(parse_input("go"), None);
    }

    #[test]
    fn words_map_to_intents() {
        assert_eq!(
            parse_input("submit"),
            Some(Input::Intent(AssessmentIntent::RequestSubmit))
        );
        assert_eq!(parse_input(""), Some(Input::Show));
        assert_eq!(parse_input("QUIT"), Some(Input::Quit));
        assert_eq!(parse_input("dance"), None);
        assert_eq!(parse_input("1"), None);
    }
}
