//! Line-oriented terminal front end.
//!
//! Generic over any `BufRead`/`Write` pair so the whole menu can be scripted in tests. End of
//! input while at the main menu behaves like "Save and exit".

use super::session::{GameSession, GameSummary, GenerateError, SavedGame};
use crate::config::GameConfig;
use crate::economy::{capitalize, Artifact, Category, Rarity};
use crate::storage::GameStorage;
use crate::void::ArtifactSource;
use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{BufRead, Write};

const WIDTH: usize = 70;

pub struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Print `question`, read one line. `None` at end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.out, "{}", question)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .ask(question)?
            .map(|a| a.eq_ignore_ascii_case("y"))
            .unwrap_or(false))
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn centered(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{:^width$}", text, width = WIDTH)?;
        Ok(())
    }

    fn boxed(&mut self, text: &str) -> Result<()> {
        let inner = WIDTH - 2;
        writeln!(self.out, "╔{}╗", "═".repeat(inner))?;
        for row in text.lines() {
            writeln!(self.out, "║{:^inner$}║", row, inner = inner)?;
        }
        writeln!(self.out, "╚{}╝", "═".repeat(inner))?;
        Ok(())
    }

    fn rule(&mut self, width: usize) -> Result<()> {
        writeln!(self.out, "{}", "-".repeat(width))?;
        Ok(())
    }
}

enum MenuChoice {
    Generate,
    Collection,
    Market,
    Sell,
    SaveAndExit,
    Invalid,
}

impl MenuChoice {
    fn parse(answer: Option<&str>) -> Self {
        match answer {
            Some("1") => MenuChoice::Generate,
            Some("2") => MenuChoice::Collection,
            Some("3") => MenuChoice::Market,
            Some("4") => MenuChoice::Sell,
            Some("5") | None => MenuChoice::SaveAndExit,
            Some(_) => MenuChoice::Invalid,
        }
    }
}

/// Load or start a game, then run the menu loop until the player saves and exits.
pub async fn play<S, R, W>(
    config: &GameConfig,
    storage: GameStorage,
    source: S,
    console: &mut Console<R, W>,
) -> Result<GameSummary>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    let saved = SavedGame::load(&storage, config.starting_credits)
        .with_context(|| format!("reading saved game from {}", storage.save_dir().display()))?;

    let resume = match saved {
        Some(_) => console.confirm("Would you like to continue your saved game? (y/n): ")?,
        None => false,
    };
    let mut session = match saved {
        Some(saved) if resume => GameSession::resume(config, saved, source),
        _ => GameSession::new_game(config, storage, source),
    };

    console.boxed(
        "\nTHE VOID ARTIFACT TRADER\n\nCollect • Trade • Discover\n\n\
         The Deep Void produces virtual artifacts of strange origin.\n\
         Will you become a master collector?\n",
    )?;
    console.line(&format!(
        "You have {} credits to start.\n",
        session.player().credits()
    ))?;

    run(&mut session, console).await?;

    let summary = session.summary();
    console.boxed("GAME SUMMARY")?;
    console.line(&summary.to_string())?;
    console.line("\nThank you for playing The Void Artifact Trader!")?;
    Ok(summary)
}

/// The turn loop.
pub async fn run<S, R, W>(session: &mut GameSession<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    loop {
        if session.begin_turn() {
            console.line("\n>>> Market conditions have shifted. <<<\n")?;
        }
        show_status(session, console)?;

        console.line("\nWhat would you like to do?")?;
        console.line("1. Generate artifacts from the Deep Void")?;
        console.line("2. View your collection")?;
        console.line("3. Check market conditions")?;
        console.line("4. Sell artifacts")?;
        console.line("5. Save and exit")?;
        let answer = console.ask("> ")?;

        match MenuChoice::parse(answer.as_deref()) {
            MenuChoice::Generate => generate(session, console).await?,
            MenuChoice::Collection => view_collection(session, console)?,
            MenuChoice::Market => view_market(session, console)?,
            MenuChoice::Sell => sell(session, console)?,
            MenuChoice::SaveAndExit => {
                if answer.is_none() {
                    info!("input closed; saving and exiting");
                }
                session.save().context("saving game")?;
                console.line("\nGame saved successfully!")?;
                return Ok(());
            }
            MenuChoice::Invalid => console.line("Invalid choice. Please try again.")?,
        }
        session.end_turn();
    }
}

fn show_status<S, R: BufRead, W: Write>(
    session: &GameSession<S>,
    console: &mut Console<R, W>,
) -> Result<()>
where
    S: ArtifactSource,
{
    console.centered("=== THE VOID ARTIFACT TRADER ===")?;
    console.line(&format!(
        "Turn: {} | Credits: {} | Artifacts: {}",
        session.turn(),
        session.player().credits(),
        session.player().collection().len()
    ))?;
    console.line(&format!("Reputation: {:.2}x", session.market().reputation()))?;
    console.rule(WIDTH)
}

fn preview<R: BufRead, W: Write>(artifact: &Artifact, console: &mut Console<R, W>) -> Result<()> {
    console.line(&format!(
        "[{}] {}",
        artifact.rarity.label().to_uppercase(),
        artifact.name
    ))?;
    console.line(&format!(
        "Category: {} | Value: {} credits",
        capitalize(artifact.category.label()),
        artifact.base_value.unwrap_or(0)
    ))?;
    let lines: Vec<&str> = artifact.ascii_art.lines().collect();
    if lines.len() > 3 {
        console.line(&format!("{}\n...", lines[..3].join("\n")))
    } else {
        console.line(&artifact.ascii_art)
    }
}

async fn generate<S, R, W>(session: &mut GameSession<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    let max = session.max_batch_size();
    console.centered("=== ARTIFACT GENERATION ===")?;
    console.line("The Deep Void can produce artifacts of different rarities.")?;
    console.line("Each rarity has a different cost:")?;
    for rarity in Rarity::ALL {
        console.line(&format!(
            "- {}: {} credits",
            capitalize(rarity.label()),
            rarity.cost()
        ))?;
    }
    console.line(&format!("\nYou have {} credits.", session.player().credits()))?;

    let answer = console.ask(&format!(
        "\nHow many artifacts would you like to generate? (1-{})\n> ",
        max
    ))?;
    let count = match answer.as_deref().map(str::parse::<usize>) {
        Some(Ok(n)) => n.clamp(1, max),
        _ => {
            console.line("Invalid input. Generating 1 artifact.")?;
            1
        }
    };

    let plan = if console.confirm("\nDo you want to specify rarities? (y/n): ")? {
        console.line("\nChoose rarities (enter the number):")?;
        for (i, rarity) in Rarity::ALL.iter().enumerate() {
            console.line(&format!(
                "{}. {} ({} credits)",
                i + 1,
                capitalize(rarity.label()),
                rarity.cost()
            ))?;
        }
        let mut rarities = Vec::with_capacity(count);
        for i in 0..count {
            let answer = console.ask(&format!(
                "Artifact {} rarity (1-{}): ",
                i + 1,
                Rarity::ALL.len()
            ))?;
            let picked = answer
                .as_deref()
                .and_then(|a| a.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .and_then(|n| Rarity::ALL.get(n).copied());
            match picked {
                Some(rarity) => rarities.push(rarity),
                None => {
                    console.line("Invalid choice. Using common.")?;
                    rarities.push(Rarity::Common);
                }
            }
        }
        session.plan_rarities(&rarities)
    } else {
        session.plan_random(count)
    };

    let cost = plan.total_cost();
    if !session.player().can_afford(cost) {
        console.line(&format!(
            "\nYou don't have enough credits! That would cost {} credits.",
            cost
        ))?;
        return Ok(());
    }
    if !console.confirm(&format!(
        "\nThis will cost {} credits. Proceed? (y/n)\n> ",
        cost
    ))? {
        console.line("Generation cancelled.")?;
        return Ok(());
    }

    console.line("\nGenerating artifacts from the Deep Void...")?;
    console.line("This may take a moment as the Void forms your artifacts...")?;

    match session.generate(&plan).await {
        Ok(outcome) => {
            console.line("\n=== ARTIFACTS DISCOVERED ===")?;
            for discovery in &outcome.discoveries {
                if let Some(artifact) = session.player().get(&discovery.id) {
                    preview(artifact, console)?;
                    console.line("")?;
                }
                match &discovery.exported {
                    Ok(path) => console.line(&format!("Saved to: {}", path.display()))?,
                    Err(e) => console.line(&format!("Could not save to file: {}", e))?,
                }
                console.rule(40)?;
            }
            if outcome.discoveries.len() < outcome.requested {
                console.line(&format!(
                    "The void only yielded {} of {} artifacts.",
                    outcome.discoveries.len(),
                    outcome.requested
                ))?;
            }
            console.line(&format!(
                "\nYou now have {} credits remaining.",
                session.player().credits()
            ))?;
        }
        Err(GenerateError::Unaffordable { cost, .. }) => {
            console.line(&format!(
                "\nYou don't have enough credits! That would cost {} credits.",
                cost
            ))?;
        }
        Err(e) => {
            console.line(&format!("\nError generating artifacts: {}", e))?;
            console.line("Your credits have been refunded.")?;
        }
    }
    Ok(())
}

fn view_collection<S, R, W>(session: &GameSession<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.centered("=== YOUR COLLECTION ===")?;
    if session.player().collection().is_empty() {
        console.line("\nYour collection is empty. Generate some artifacts first!")?;
        return Ok(());
    }
    console.line(&format!(
        "Total artifacts: {}",
        session.player().collection().len()
    ))?;
    console.line("\nHow would you like to view your collection?")?;
    console.line("1. By rarity")?;
    console.line("2. By category")?;
    console.line("3. View a specific artifact")?;
    console.line("4. Return to main menu")?;

    let ids = match console.ask("> ")?.as_deref() {
        Some("1") => list_by_rarity(session, console)?,
        Some("2") => list_by_category(session, console)?,
        Some("3") => list_all(session, console)?,
        _ => return Ok(()),
    };
    if ids.is_empty() {
        return Ok(());
    }

    let answer = console.ask("\nEnter a number to view details, or 0 to return:\n> ")?;
    let picked = answer
        .as_deref()
        .and_then(|a| a.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| ids.get(n));
    if let Some(id) = picked {
        show_artifact(session, id, console)?;
    }
    Ok(())
}

fn listing_row<S: ArtifactSource>(
    session: &GameSession<S>,
    index: usize,
    artifact: &Artifact,
    with_rarity: bool,
) -> String {
    let rarity = if with_rarity {
        format!("[{}] ", artifact.rarity.label().to_uppercase())
    } else {
        String::new()
    };
    format!(
        "{}. {}{} (ID: {}...) - {} credits",
        index,
        rarity,
        artifact.name,
        artifact.short_id(),
        session.value_of(artifact)
    )
}

fn list_by_rarity<S, R, W>(session: &GameSession<S>, console: &mut Console<R, W>) -> Result<Vec<String>>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.centered("=== COLLECTION BY RARITY ===")?;
    let mut ids = Vec::new();
    for (rarity, group) in session.player().group_by_rarity().into_iter().rev() {
        console.line(&format!(
            "\n--- {} ({}) ---",
            rarity.label().to_uppercase(),
            group.len()
        ))?;
        for id in group {
            if let Some(artifact) = session.player().get(&id) {
                console.line(&listing_row(session, ids.len() + 1, artifact, false))?;
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

fn list_by_category<S, R, W>(
    session: &GameSession<S>,
    console: &mut Console<R, W>,
) -> Result<Vec<String>>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.centered("=== COLLECTION BY CATEGORY ===")?;
    let mut groups: Vec<(Category, Vec<String>)> =
        session.player().group_by_category().into_iter().collect();
    groups.sort_by_key(|(category, _)| category.label());

    let mut ids = Vec::new();
    for (category, group) in groups {
        console.line(&format!(
            "\n--- {} ({}) ---",
            category.label().to_uppercase(),
            group.len()
        ))?;
        for id in group {
            if let Some(artifact) = session.player().get(&id) {
                console.line(&listing_row(session, ids.len() + 1, artifact, true))?;
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

fn list_all<S, R, W>(session: &GameSession<S>, console: &mut Console<R, W>) -> Result<Vec<String>>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.centered("=== VIEW SPECIFIC ARTIFACT ===")?;
    let ids = session.player().listing_order();
    for (i, id) in ids.iter().enumerate() {
        if let Some(artifact) = session.player().get(id) {
            console.line(&listing_row(session, i + 1, artifact, true))?;
        }
    }
    Ok(ids)
}

fn show_artifact<S, R, W>(
    session: &GameSession<S>,
    id: &str,
    console: &mut Console<R, W>,
) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    let Some(artifact) = session.player().get(id) else {
        console.line("Artifact not found.")?;
        return Ok(());
    };
    console.centered(&format!("=== {} ===", artifact.name))?;
    console.line(&format!("ID: {}", artifact.id))?;
    console.line(&format!(
        "Rarity: {} | Category: {}",
        artifact.rarity.label().to_uppercase(),
        capitalize(artifact.category.label())
    ))?;
    console.line(&format!(
        "Base Value: {} credits | Current Market Value: {} credits",
        artifact.base_value.unwrap_or(0),
        session.value_of(artifact)
    ))?;
    console.rule(WIDTH)?;
    if !artifact.ascii_art.is_empty() {
        console.line(&artifact.ascii_art)?;
        console.line("")?;
    }
    if !artifact.description.is_empty() {
        console.line(&artifact.description)?;
    }

    console.line("\nOptions:")?;
    console.line("1. Export to file")?;
    console.line("2. Return to collection")?;
    if console.ask("> ")?.as_deref() == Some("1") {
        match session.export(id) {
            Ok(path) => console.line(&format!("Exported to: {}", path.display()))?,
            Err(e) => {
                warn!("export of {} failed: {}", id, e);
                console.line(&format!("Export failed: {}", e))?;
            }
        }
    }
    Ok(())
}

fn view_market<S, R, W>(session: &GameSession<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.line(&session.market().report().to_string())?;
    console.line("\nMarket Tips:")?;
    console.line("- Market conditions shift every few turns")?;
    console.line("- Sell artifacts when their category is in high demand")?;
    console.line("- Your reputation affects selling prices")?;
    console.line("- Finding legendary artifacts improves your reputation")
}

/// Parse "all" or a comma-separated list of 1-based indices. `None` on malformed input;
/// out-of-range indices are ignored.
pub fn parse_selection(answer: &str, listed: usize) -> Option<Vec<usize>> {
    let answer = answer.trim();
    if answer.eq_ignore_ascii_case("all") {
        return Some((0..listed).collect());
    }
    let mut picked = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let n: usize = part.parse().ok()?;
        if (1..=listed).contains(&n) {
            picked.push(n - 1);
        }
    }
    Some(picked)
}

fn sell<S, R, W>(session: &mut GameSession<S>, console: &mut Console<R, W>) -> Result<()>
where
    S: ArtifactSource,
    R: BufRead,
    W: Write,
{
    console.centered("=== SELL ARTIFACTS ===")?;
    let listing = session.sale_listing();
    if listing.is_empty() {
        console.line("Your collection is empty. Nothing to sell!")?;
        return Ok(());
    }

    console.line("Select artifacts to sell:\n")?;
    for (i, line) in listing.iter().enumerate() {
        console.line(
            format!(
                "{}. [{}] {} - {} credits {}",
                i + 1,
                line.rarity.label().to_uppercase(),
                line.name,
                line.value,
                line.demand.tag()
            )
            .trim_end(),
        )?;
    }

    let answer = console.ask(
        "\nEnter the numbers of artifacts to sell (comma-separated), or 'all' to sell everything:\n> ",
    )?;
    let Some(indices) = answer.as_deref().and_then(|a| parse_selection(a, listing.len())) else {
        console.line("Invalid input. No artifacts selected.")?;
        return Ok(());
    };
    let ids: Vec<String> = indices.into_iter().map(|i| listing[i].id.clone()).collect();

    let quote = session.quote_sale(&ids);
    if quote.is_empty() {
        console.line("No artifacts selected for sale.")?;
        return Ok(());
    }

    console.line("\n=== SELLING SUMMARY ===")?;
    for line in &quote.lines {
        console.line(&format!("- {} sold for {} credits", line.name, line.value))?;
    }
    console.line(&format!("\nTotal sale value: {} credits", quote.total()))?;

    if !console.confirm("\nProceed with sale? (y/n)\n> ")? {
        console.line("Sale cancelled.")?;
        return Ok(());
    }
    session.complete_sale(quote);
    console.line(&format!(
        "\nSale complete! You now have {} credits.",
        session.player().credits()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_selection("all", 3), Some(vec![0, 1, 2]));
        assert_eq!(parse_selection("ALL", 0), Some(vec![]));
        assert_eq!(parse_selection("1, 3,9", 3), Some(vec![0, 2]));
        assert_eq!(parse_selection("", 3), Some(vec![]));
        assert_eq!(parse_selection("1,x", 3), None);
    }

    #[test]
    fn menu_end_of_input_saves() {
        assert!(matches!(MenuChoice::parse(None), MenuChoice::SaveAndExit));
        assert!(matches!(MenuChoice::parse(Some("9")), MenuChoice::Invalid));
    }

    #[test]
    fn console_reads_trimmed_lines_and_reports_eof() {
        let mut console = Console::new("  y \n".as_bytes(), Vec::new());
        assert!(console.confirm("ok? ").unwrap());
        assert_eq!(console.ask("again? ").unwrap(), None);
        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out, "ok? again? ");
    }
}
