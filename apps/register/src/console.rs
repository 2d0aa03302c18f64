//! # Console Driver
//!
//! Line-oriented front end for a sale session. Each input line is one
//! command; each reply is printed before the next line is read.
//!
//! ```text
//! > search caf
//!   1. Cafeteira          R$ 89,90   (stock 1)
//!   2. Café 500g          R$ 10,00   (stock 2)
//! > pick 2
//!   1. Café 500g       x1    R$ 10,00
//!   TOTAL                    R$ 10,00
//! > pick 2
//! ! Search result 2 does not exist (0 results)
//! > finalize
//! Sale 20260307-090530-0001 recorded: R$ 10,00
//! ```
//!
//! Positions typed by the cashier are 1-based. Refusals print a one-line
//! notice starting with `!` and the session carries on.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::collaborators::{ProductCatalog, SaleRecorder};
use crate::config::CurrencyFormat;
use crate::error::ApiError;
use crate::session::SaleSession;
use crate::view::CartView;

pub const HELP: &str = "\
Commands:
  search <text>    search the catalog (empty text closes the search)
  pick <n>         add search result n to the cart
  add <id>         add a product by id
  qty <line> <n>   set the quantity of a cart line
  rm <line>        remove a cart line
  cart             show the cart
  json             show the cart view as JSON
  finalize         record the sale
  cancel           abandon the sale in progress
  help             show this help
  quit             leave the register
";

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Pick(usize),
    Add(String),
    Quantity { line: usize, quantity: i64 },
    Remove(usize),
    Cart,
    Json,
    Finalize,
    Cancel,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    ///
    /// Line and result numbers are converted to 0-based indices here.
    pub fn parse(line: &str) -> Result<Option<Command>, ApiError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => return Ok(None),
            "search" | "s" => Command::Search(rest.to_string()),
            "pick" | "p" => Command::Pick(parse_position(rest)?),
            "add" | "a" => {
                if rest.is_empty() {
                    return Err(ApiError::validation("usage: add <id>"));
                }
                Command::Add(rest.to_string())
            }
            "qty" | "q" => {
                let (line, quantity) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| ApiError::validation("usage: qty <line> <n>"))?;
                let quantity = quantity
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::validation("quantity must be a whole number"))?;
                Command::Quantity {
                    line: parse_position(line)?,
                    quantity,
                }
            }
            "rm" | "remove" => Command::Remove(parse_position(rest)?),
            "cart" | "c" => Command::Cart,
            "json" => Command::Json,
            "finalize" | "f" => Command::Finalize,
            "cancel" => Command::Cancel,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(ApiError::validation(format!(
                    "unknown command '{}', type help",
                    other
                )))
            }
        };

        Ok(Some(command))
    }
}

/// Parses a 1-based position into a 0-based index.
fn parse_position(text: &str) -> Result<usize, ApiError> {
    match text.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ApiError::validation(format!(
            "'{}' is not a position (positions start at 1)",
            text.trim()
        ))),
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Reads commands from `input` until `quit` or end of input.
pub async fn run<C, R, I, O>(
    session: &mut SaleSession<C, R>,
    format: &CurrencyFormat,
    store_name: &str,
    input: I,
    mut output: O,
) -> std::io::Result<()>
where
    C: ProductCatalog,
    R: SaleRecorder,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    output
        .write_all(format!("{} - new sale (type help)\n", store_name).as_bytes())
        .await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                debug!(?command, "Console command");
                execute(session, format, command).await
            }
            Err(e) => Err(e),
        };

        let text = match reply {
            Ok(text) => text,
            Err(e) => format!("! {}\n", e.message),
        };
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

/// Runs one command against the session and renders the reply.
pub async fn execute<C, R>(
    session: &mut SaleSession<C, R>,
    format: &CurrencyFormat,
    command: Command,
) -> Result<String, ApiError>
where
    C: ProductCatalog,
    R: SaleRecorder,
{
    match command {
        Command::Search(query) => {
            session.search(&query).await?;
            Ok(render(&session.view(format)))
        }
        Command::Pick(index) => {
            session.select_result(index)?;
            Ok(render(&session.view(format)))
        }
        Command::Add(id) => {
            session.add_product_by_id(&id).await?;
            Ok(render(&session.view(format)))
        }
        Command::Quantity { line, quantity } => {
            session.set_quantity(line, quantity)?;
            Ok(render(&session.view(format)))
        }
        Command::Remove(line) => {
            session.remove_line(line)?;
            Ok(render(&session.view(format)))
        }
        Command::Cart => Ok(render(&session.view(format))),
        Command::Json => {
            let json = serde_json::to_string_pretty(&session.view(format))
                .map_err(|e| ApiError::internal(e.to_string()))?;
            Ok(format!("{}\n", json))
        }
        Command::Finalize => {
            let sale = session.finalize_sale().await?;
            Ok(format!(
                "Sale {} recorded: {}\n",
                sale.receipt_number,
                format.format(sale.total())
            ))
        }
        Command::Cancel => {
            session.reset();
            Ok("Sale cancelled\n".to_string())
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

/// Renders what the sale screen would show for this view.
pub fn render(view: &CartView) -> String {
    let mut out = String::new();

    if view.is_searching {
        if view.show_search_results {
            for result in &view.search_results {
                out.push_str(&format!(
                    "  {}. {:<28} {:>12}   (stock {})\n",
                    result.position, result.name, result.price_display, result.stock
                ));
            }
        } else {
            out.push_str(&format!("  No products match '{}'\n", view.query));
        }
        return out;
    }

    if view.show_empty_placeholder {
        out.push_str("  Cart is empty\n");
        return out;
    }

    for line in &view.lines {
        out.push_str(&format!(
            "  {}. {:<24} x{:<4} {:>12}\n",
            line.position, line.name, line.quantity, line.line_total_display
        ));
    }
    out.push_str(&format!("  {:<31} {:>12}\n", "TOTAL", view.total_display));
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
