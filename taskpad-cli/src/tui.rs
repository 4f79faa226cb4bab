//! Interactive terminal UI: the view-controller over the task store.
//!
//! Every mutation is one full cycle (load, mutate, save, reload) so the
//! rendered list always reflects the file. The only state that survives
//! between interactions is the optional position of the task being edited.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use taskpad_core::{
    clear_completed, completed_view, counts, pending_view, LoadError, Priority, SortOption, Task,
    TaskStore, DEFAULT_CATEGORY,
};

use crate::commands::{priority_marker, status_icon};
use crate::config::Config;

pub fn run(store: TaskStore, cfg: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, store, cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    store: TaskStore,
    cfg: &Config,
) -> Result<()> {
    let mut app = App::new(store, cfg)?;

    loop {
        terminal.draw(|f| draw(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key.code)? {
                return Ok(());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Adding,
    /// Stored position of the task open for editing; cleared on save/cancel.
    Editing {
        position: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Description,
    Priority,
    Due,
    Category,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Description => Field::Priority,
            Field::Priority => Field::Due,
            Field::Due => Field::Category,
            Field::Category => Field::Description,
        }
    }

    fn prev(self) -> Self {
        self.next().next().next()
    }
}

#[derive(Debug, Clone)]
struct Form {
    description: String,
    priority: Priority,
    due: String,
    category: String,
    focus: Field,
}

impl Form {
    fn for_add(today: NaiveDate) -> Self {
        Self {
            description: String::new(),
            priority: Priority::Medium,
            due: today.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            focus: Field::Description,
        }
    }

    fn for_task(task: &Task) -> Self {
        Self {
            description: task.description.clone(),
            priority: task.priority,
            due: task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            category: task.category.clone(),
            focus: Field::Description,
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Description => Some(&mut self.description),
            Field::Due => Some(&mut self.due),
            Field::Category => Some(&mut self.category),
            Field::Priority => None,
        }
    }
}

struct App {
    store: TaskStore,
    tasks: Vec<Task>,
    mode: Mode,
    form: Form,
    sort: SortOption,
    show_completed: bool,
    /// Cursor into the rendered rows (pending first, then completed).
    selected: usize,
    notice: Option<String>,
}

impl App {
    fn new(store: TaskStore, cfg: &Config) -> Result<Self> {
        let (tasks, notice) = match store.try_load() {
            Ok(tasks) => (tasks, None),
            Err(LoadError::Malformed { .. }) => (
                Vec::new(),
                Some(format!(
                    "{} is malformed; starting with an empty list",
                    store.path().display()
                )),
            ),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            store,
            tasks,
            mode: Mode::Normal,
            form: Form::for_add(Local::now().date_naive()),
            sort: cfg.ui.sort,
            show_completed: cfg.ui.show_completed,
            selected: 0,
            notice,
        })
    }

    fn rows(&self) -> Vec<(usize, &Task)> {
        let mut rows = pending_view(&self.tasks, self.sort);
        if self.show_completed {
            rows.extend(completed_view(&self.tasks));
        }
        rows
    }

    fn selected_position(&self) -> Option<usize> {
        self.rows().get(self.selected).map(|(pos, _)| *pos)
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows().len().saturating_sub(1));
    }

    fn reload(&mut self) -> Result<()> {
        self.tasks = self.store.load()?;
        self.clamp_selection();
        Ok(())
    }

    /// One full interaction cycle: load, mutate, save, reload.
    fn mutate<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Task>),
    {
        let mut tasks = self.store.load()?;
        f(&mut tasks);
        self.store.save(&tasks)?;
        self.reload()
    }

    /// Returns false when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        self.notice = None;
        match self.mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Adding | Mode::Editing { .. } => self.handle_form_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') => return Ok(false),

            KeyCode::Char('a') => {
                self.form = Form::for_add(Local::now().date_naive());
                self.mode = Mode::Adding;
            }

            KeyCode::Char('e') => {
                if let Some(pos) = self.selected_position() {
                    self.form = Form::for_task(&self.tasks[pos]);
                    self.mode = Mode::Editing { position: pos };
                }
            }

            KeyCode::Char('d') => {
                if let Some(pos) = self.selected_position() {
                    self.mutate(|tasks| {
                        tasks.remove(pos);
                    })?;
                    self.notice = Some("Task deleted".to_string());
                }
            }

            KeyCode::Char(' ') => {
                if let Some(pos) = self.selected_position() {
                    self.mutate(|tasks| tasks[pos].done = !tasks[pos].done)?;
                }
            }

            KeyCode::Char('c') => {
                self.mutate(clear_completed)?;
                self.notice = Some("Cleared completed tasks".to_string());
            }

            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                self.clamp_selection();
            }

            KeyCode::Char('v') => {
                self.show_completed = !self.show_completed;
                self.clamp_selection();
            }

            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.rows().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }

            _ => {}
        }
        Ok(true)
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => self.submit_form()?,
            KeyCode::Tab | KeyCode::Down => self.form.focus = self.form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus = self.form.focus.prev(),
            KeyCode::Left if self.form.focus == Field::Priority => {
                self.form.priority = self.form.priority.prev();
            }
            KeyCode::Right if self.form.focus == Field::Priority => {
                self.form.priority = self.form.priority.next();
            }
            KeyCode::Backspace => {
                if let Some(text) = self.form.active_text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.form.active_text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
        Ok(true)
    }

    fn submit_form(&mut self) -> Result<()> {
        let description = self.form.description.trim().to_string();
        if description.is_empty() {
            self.notice = Some("Please enter a task description".to_string());
            return Ok(());
        }

        let due = match parse_due(&self.form.due) {
            Ok(due) => due,
            Err(msg) => {
                self.notice = Some(msg);
                return Ok(());
            }
        };

        let priority = self.form.priority;
        let category = self.form.category.clone();

        match self.mode {
            Mode::Adding => {
                if let Some(d) = due {
                    if d < Local::now().date_naive() {
                        self.notice = Some(format!("due date {d} is in the past"));
                        return Ok(());
                    }
                }
                self.mutate(move |tasks| {
                    let mut task = Task::new(description)
                        .with_priority(priority)
                        .with_category(category);
                    if let Some(d) = due {
                        task = task.with_due_date(d);
                    }
                    tasks.push(task);
                })?;
                self.notice = Some("Task added".to_string());
            }

            Mode::Editing { position } => {
                self.mutate(move |tasks| {
                    if let Some(task) = tasks.get_mut(position) {
                        task.apply_edit(description, priority, due, category);
                    }
                })?;
                self.notice = Some("Task updated".to_string());
            }

            Mode::Normal => {}
        }

        self.mode = Mode::Normal;
        Ok(())
    }
}

fn parse_due(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid due date '{raw}' (expected YYYY-MM-DD)"))
}

fn draw(f: &mut Frame, app: &App) {
    let today = Local::now().date_naive();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(f.area());

    let c = counts(&app.tasks);
    let header = Paragraph::new(Line::from(vec![
        Span::styled("taskpad", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "   {} total · {} pending · {} completed",
            c.total, c.pending, c.completed
        )),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, outer[0]);

    let pending = pending_view(&app.tasks, app.sort);
    let pending_title = format!("Pending · sorted by {}", app.sort);

    if app.show_completed {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer[1]);
        render_section(f, body[0], &pending_title, &pending, 0, app.selected, today);
        let completed = completed_view(&app.tasks);
        render_section(
            f,
            body[1],
            "Completed",
            &completed,
            pending.len(),
            app.selected,
            today,
        );
    } else {
        render_section(f, outer[1], &pending_title, &pending, 0, app.selected, today);
    }

    let mut footer = vec![Line::from(
        "a add · e edit · d delete · space done/undo · c clear completed · s sort · v completed · q quit",
    )];
    if let Some(notice) = &app.notice {
        footer.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(footer), outer[2]);

    if app.mode != Mode::Normal {
        draw_form(f, app);
    }
}

fn render_section(
    f: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[(usize, &Task)],
    row_offset: usize,
    selected: usize,
    today: NaiveDate,
) {
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, (pos, task))| {
            let style = if row_offset + i == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(task_line(*pos, task, today)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string()),
    );
    f.render_widget(list, area);
}

fn task_line(pos: usize, task: &Task, today: NaiveDate) -> Line<'static> {
    let description_style = if task.done {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(format!("{:>3}. ", pos + 1)),
        Span::raw(format!("{} ", status_icon(task.status_on(today)))),
        Span::styled(task.description.clone(), description_style),
        Span::styled(
            format!("  {} {}", priority_marker(task.priority), task.priority),
            Style::default().fg(priority_color(task.priority)),
        ),
    ];
    if let Some(due) = task.due_date {
        spans.push(Span::raw(format!("  due {due}")));
    }
    spans.push(Span::styled(
        format!("  #{}", task.category),
        Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_form(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let title = match app.mode {
        Mode::Adding => "Add Task",
        Mode::Editing { .. } => "Edit Task",
        Mode::Normal => return,
    };

    let form = &app.form;
    let lines = vec![
        form_line("Description", &form.description, form.focus == Field::Description),
        form_line(
            "Priority",
            &format!("< {} >", form.priority),
            form.focus == Field::Priority,
        ),
        form_line("Due (Y-m-d)", &form.due, form.focus == Field::Due),
        form_line("Category", &form.category, form.focus == Field::Category),
        Line::from(""),
        Line::from(Span::styled(
            "Enter save · Esc cancel · Tab next field · ←/→ priority",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(popup, area);
}

fn form_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(format!("{label:<13}"), Style::default().fg(Color::Cyan)),
        Span::styled(value.to_string(), value_style),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
