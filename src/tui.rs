use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::time::Instant;

use crate::context::ConverterContext;
use crate::form::{ConverterForm, CurrencySelect, Field};
use crate::models::CurrencyOption;

/// Values to put into the form once the currency lists are available
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Prefill {
    fn apply(&self, form: &mut ConverterForm) {
        if let Some(amount) = &self.amount {
            form.amount.set(amount.as_str());
        }
        for (code, select) in [(&self.from, &mut form.from), (&self.to, &mut form.to)] {
            if let Some(code) = code {
                if !select.select_code(&code.to_ascii_uppercase()) {
                    log::warn!("Currency {} is not in the list", code);
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Continue,
    Convert,
    Quit,
}

fn handle_key(form: &mut ConverterForm, key: KeyEvent) -> Action {
    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || ctrl_c {
        return Action::Quit;
    }

    match (form.focus(), key.code) {
        (_, KeyCode::Tab) => form.set_focus(form.focus().next()),
        (_, KeyCode::BackTab) => form.set_focus(form.focus().previous()),
        (_, KeyCode::Enter) | (Field::Convert, KeyCode::Char(' ')) => return Action::Convert,
        (Field::Amount, KeyCode::Char(c)) => form.amount.push(c),
        (Field::Amount, KeyCode::Backspace) => form.amount.pop(),
        (Field::From, KeyCode::Down) => form.from.next(),
        (Field::From, KeyCode::Up) => form.from.previous(),
        (Field::To, KeyCode::Down) => form.to.next(),
        (Field::To, KeyCode::Up) => form.to.previous(),
        _ => {}
    }
    Action::Continue
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    ctx: ConverterContext,
    prefill: Prefill,
) -> Result<()> {
    let loader = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if ctx.load_directory().await > 0 {
                prefill.apply(&mut *ctx.form().lock().await);
            }
        })
    };

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        {
            let mut form = ctx.form().lock().await;
            form.banner.tick(Instant::now());
            terminal.draw(|f| draw_ui(f, &form))?;
        }

        let event = tokio::select! {
            _ = ticker.tick() => None,
            event = events.next() => match event {
                Some(Ok(event)) => Some(event),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        };

        let Some(Event::Key(key)) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let action = handle_key(&mut *ctx.form().lock().await, key);
        match action {
            Action::Quit => break,
            Action::Convert => {
                let _ = ctx.spawn_convert();
            }
            Action::Continue => {}
        }
    }

    loader.abort();
    Ok(())
}

fn draw_ui(f: &mut Frame, form: &ConverterForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new("Currency Converter")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let amount = Paragraph::new(form.amount.value())
        .block(field_block("Amount".to_string(), form.focus() == Field::Amount));
    f.render_widget(amount, chunks[1]);

    let selects = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_select(f, selects[0], "From", &form.from, form.focus() == Field::From);
    draw_select(f, selects[1], "To", &form.to, form.focus() == Field::To);

    let convert = Paragraph::new("[ Convert ]")
        .alignment(Alignment::Center)
        .block(field_block(String::new(), form.focus() == Field::Convert));
    f.render_widget(convert, chunks[3]);

    let output = Paragraph::new(form.output())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().title("Result").borders(Borders::ALL));
    f.render_widget(output, chunks[4]);

    let error_text = if form.error_visible() {
        form.banner.message()
    } else {
        ""
    };
    let error = Paragraph::new(error_text)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(error, chunks[5]);

    let help = Line::from(vec![
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" next field  "),
        Span::styled("Up/Down", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" pick currency  "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" convert  "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[6]);
}

fn draw_select(f: &mut Frame, area: Rect, title: &str, select: &CurrencySelect, focused: bool) {
    let items: Vec<ListItem> = select
        .options()
        .iter()
        .map(|option| ListItem::new(option.label.as_str()))
        .collect();

    let title = match select.selected_option().and_then(currency_detail) {
        Some(detail) => format!("{}: {}", title, detail),
        None => title.to_string(),
    };

    let list = List::new(items)
        .block(field_block(title, focused))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(select.selected_index()));
    f.render_stateful_widget(list, area, &mut state);
}

/// "Euro (€)" style summary of the selected currency
fn currency_detail(option: &CurrencyOption) -> Option<String> {
    if option.is_placeholder() {
        return None;
    }
    let name = option.currency.name.as_deref().unwrap_or(&option.code);
    Some(match option.currency.symbol.as_deref() {
        Some(symbol) => format!("{} ({})", name, symbol),
        None => name.to_string(),
    })
}

fn field_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

pub async fn start_tui(ctx: ConverterContext, prefill: Prefill) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, ctx, prefill).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
