use inquire::validator::Validation;
use inquire::{Select, Text};

use crate::form::{validate_field, Field, FormController, FormData, Step, ROLES};

/// What the applicant wants to do from the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Submit,
    Back,
    Cancel,
}

/// Prompts for the fields of the current step. With `revisit` every field is
/// asked again (pre-filled); otherwise only blank or invalid ones are.
pub fn fill_step(controller: &mut FormController, revisit: bool) -> anyhow::Result<()> {
    let step = controller.step();
    println!();
    println!("Step {} of 3: {}", step.number(), step.title());

    for field in step.fields() {
        let data = controller.data();
        let needs_input = revisit
            || validate_field(data, *field).is_err()
            || (!field.required() && data.is_blank(*field));
        if !needs_input {
            continue;
        }
        let value = ask(data, *field)?;
        controller.data_mut().set(*field, value);
    }
    Ok(())
}

fn ask(data: &FormData, field: Field) -> anyhow::Result<String> {
    match field {
        Field::Pref1 | Field::Pref2 => ask_role(data, field),
        _ => {
            let snapshot = data.clone();
            let current = data.text(field).to_string();
            let label = format!("{}:", field.label());
            let mut prompt = Text::new(&label)
                .with_initial_value(&current)
                .with_validator(move |input: &str| {
                    let mut candidate = snapshot.clone();
                    candidate.set(field, input.to_string());
                    Ok(match validate_field(&candidate, field) {
                        Ok(()) => Validation::Valid,
                        Err(e) => Validation::Invalid(e.to_string().into()),
                    })
                });
            if !field.required() {
                prompt = prompt.with_help_message("optional, press enter to skip");
            }
            Ok(prompt.prompt()?)
        }
    }
}

/// The second preference never offers the role picked first.
fn ask_role(data: &FormData, field: Field) -> anyhow::Result<String> {
    let options: Vec<&str> = ROLES
        .iter()
        .copied()
        .filter(|role| field != Field::Pref2 || *role != data.pref1.trim())
        .collect();
    let start = options
        .iter()
        .position(|role| *role == data.text(field).trim())
        .unwrap_or(0);
    let choice = Select::new(&format!("{}:", field.label()), options)
        .with_starting_cursor(start)
        .prompt()?;
    Ok(choice.to_string())
}

pub fn review(data: &FormData) -> anyhow::Result<ReviewChoice> {
    println!();
    for step in Step::ALL {
        for field in step.fields() {
            println!("  {:<20} {}", field.label(), data.text(*field));
        }
    }
    println!();

    let choice = Select::new(
        "Ready to submit?",
        vec!["Submit", "Edit previous step", "Cancel"],
    )
    .prompt()?;
    Ok(match choice {
        "Submit" => ReviewChoice::Submit,
        "Edit previous step" => ReviewChoice::Back,
        _ => ReviewChoice::Cancel,
    })
}
