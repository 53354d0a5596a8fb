//! The portfolio page: section layout and the reveal choreography of each
//! section.
//!
//! Layout here is a fixed vertical stack sized from the viewport width; a
//! real host replaces it by reporting measured rects through
//! [`set_rect`](crate::set_rect) and calling [`Page::refresh`].

use std::time::Instant;

use crate::animation::{EaseDirection, Repeat, TimingFunction, Transition, VisualState};
use crate::content::SiteContent;
use crate::element::{ElementId, Rect};
use crate::executor::CancellationToken;
use crate::header::{self, HeaderState};
use crate::hover::{HoverEffect, HoverKey};
use crate::reveal::Reveal;
use crate::runtime::{self, create_child, create_element, open_scope, with_stage};
use crate::scope::ScopeHandle;
use crate::timeline::{Position, Step, Timeline};

pub const ABOUT_HEADING: &str = "About Me";

const HEADING_HEIGHT: f32 = 48.0;
const SECTION_PADDING: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    About,
    Projects,
    Skills,
    TechStack,
    Contact,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::TechStack,
        SectionKind::Contact,
    ];

    pub fn anchor(self) -> &'static str {
        match self {
            SectionKind::Hero => "#home",
            SectionKind::About => "#about",
            SectionKind::Projects => "#projects",
            SectionKind::Skills => "#skills",
            SectionKind::TechStack => "#tech",
            SectionKind::Contact => "#contact",
        }
    }
}

/// Element ids of one mounted section.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub root: ElementId,
    /// Hero title or section heading
    pub heading: ElementId,
    /// Per-character units of a split heading
    pub heading_units: Vec<ElementId>,
    /// Single named blocks (hero lines, about image/content, grids, ...)
    pub parts: Vec<ElementId>,
    /// Repeated cards or tiles, in content order
    pub items: Vec<ElementId>,
    /// Secondary element per item (tech image containers)
    pub item_decor: Vec<ElementId>,
    pub scope: ScopeHandle,
}

pub struct Page {
    pub content: SiteContent,
    pub header: HeaderState,
    pub header_element: ElementId,
    pub main: ElementId,
    pub sections: Vec<Section>,
    page_scope: ScopeHandle,
    header_entrance: CancellationToken,
    mounted: bool,
}

fn fade_up(distance: f32) -> (VisualState, VisualState) {
    (
        VisualState::new().opacity(0.0).y(distance),
        VisualState::new().opacity(1.0).y(0.0),
    )
}

fn slide_in(distance: f32) -> (VisualState, VisualState) {
    (
        VisualState::new().opacity(0.0).x(distance),
        VisualState::new().opacity(1.0).x(0.0),
    )
}

/// Stacks sections top to bottom.
struct Layout {
    width: f32,
    cursor: f32,
}

impl Layout {
    fn section(&mut self, height: f32) -> Rect {
        let rect = Rect::new(0.0, self.cursor, self.width, height);
        self.cursor += height;
        rect
    }

    fn heading(section: &Rect) -> Rect {
        Rect::new(section.x, section.y + SECTION_PADDING, section.width, HEADING_HEIGHT)
    }

    /// Cells of a grid with `columns` columns starting at `top`.
    fn grid(section: &Rect, top: f32, count: usize, columns: usize, cell_height: f32) -> Vec<Rect> {
        let columns = columns.max(1);
        let cell_width = section.width / columns as f32;
        (0..count)
            .map(|i| {
                let row = (i / columns) as f32;
                let col = (i % columns) as f32;
                Rect::new(
                    section.x + col * cell_width,
                    top + row * (cell_height + 32.0),
                    cell_width,
                    cell_height,
                )
            })
            .collect()
    }
}

fn child(parent: ElementId, rect: Rect) -> ElementId {
    // The parent was created a moment ago on this thread, so it exists; a
    // fallback root element keeps the page usable regardless.
    create_child(parent, rect).unwrap_or_else(|| create_element(rect))
}

impl Page {
    /// Lay out and mount every section, then the page-wide section reveal.
    pub fn mount(content: SiteContent) -> Self {
        let width = with_stage(|stage| stage.viewport().width);
        let mut layout = Layout { width, cursor: 0.0 };

        let header_element = create_element(Rect::new(0.0, 0.0, width, 72.0));
        let header_entrance = header::play_entrance(header_element);

        let main = create_element(Rect::new(0.0, 0.0, width, 0.0));
        let sections = vec![
            mount_hero(main, &mut layout),
            mount_about(main, &mut layout),
            mount_projects(main, &mut layout, content.projects.len()),
            mount_skills(main, &mut layout, content.skills.len()),
            mount_tech_stack(main, &mut layout, &content),
            mount_contact(main, &mut layout),
        ];
        runtime::set_rect(main, Rect::new(0.0, 0.0, width, layout.cursor));

        // Parent effects run after the sections mounted theirs
        let page_scope = open_scope(main);
        page_scope.run(|| {
            for section in &sections {
                let (from, to) = fade_up(50.0);
                Reveal::from_to([section.root], from, to)
                    .duration(1000.0)
                    .timing(TimingFunction::Power(3, EaseDirection::Out))
                    .scroll_trigger(section.root)
                    .play();
            }
        });

        log::info!(
            "page mounted: {} sections, {} scroll triggers",
            sections.len(),
            runtime::trigger_count()
        );

        Self {
            content,
            header: HeaderState::default(),
            header_element,
            main,
            sections,
            page_scope,
            header_entrance,
            mounted: true,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn scroll_to(&mut self, scroll_y: f32, now: Instant) {
        self.header.on_scroll(scroll_y);
        runtime::scroll_to(scroll_y, now);
    }

    /// Scroll so the given section's top sits at the viewport top.
    pub fn navigate(&mut self, href: &str, now: Instant) -> bool {
        let Some(section) = self.sections.iter().find(|s| s.kind.anchor() == href) else {
            return false;
        };
        let top = with_stage(|stage| stage.elements().rect(section.root).map(|r| r.top()));
        self.header.navigate();
        match top {
            Some(top) => {
                self.scroll_to(top, now);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32, now: Instant) {
        runtime::resize(width, height, now);
    }

    /// Re-evaluate triggers after the host reported new geometry.
    pub fn refresh(&mut self, now: Instant) {
        runtime::refresh(now);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        runtime::tick(now)
    }

    pub fn hover_technology(&self, name: &str, now: Instant) {
        runtime::pointer_enter(&tech_hover_key(name), now);
    }

    pub fn leave_technology(&self, name: &str, now: Instant) {
        runtime::pointer_leave(&tech_hover_key(name), now);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Dispose every section scope and the page scope. Elements keep their
    /// current values. Calling it again does nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.header_entrance.cancel();
        for section in &self.sections {
            section.scope.dispose();
        }
        self.page_scope.dispose();
        self.mounted = false;
        log::info!("page unmounted");
    }
}

pub fn tech_hover_key(name: &str) -> HoverKey {
    HoverKey::new(format!("tech/{}", name))
}

fn heading_reveal(heading: ElementId) {
    let (from, to) = fade_up(30.0);
    Reveal::from_to([heading], from, to)
        .duration(800.0)
        .scroll_trigger(heading)
        .play();
}

fn mount_hero(main: ElementId, layout: &mut Layout) -> Section {
    let rect = layout.section(800.0);
    let root = child(main, rect);
    let line = |offset: f32, height: f32| {
        child(
            root,
            Rect::new(rect.x, rect.y + offset, rect.width / 2.0, height),
        )
    };
    let title = line(160.0, 180.0);
    let subtitle = line(360.0, 40.0);
    let description = line(420.0, 96.0);
    let buttons = line(540.0, 48.0);
    let social = line(610.0, 40.0);
    let image = child(
        root,
        Rect::new(rect.width / 2.0, rect.y + 160.0, rect.width / 2.0, 480.0),
    );

    let scope = open_scope(root);
    scope.run(|| {
        let (from, to) = fade_up(30.0);
        let (title_from, title_to) = fade_up(50.0);
        let overlap = Position::Relative(-600.0);
        Timeline::new(Transition::new(
            1000.0,
            TimingFunction::Power(3, EaseDirection::Out),
        ))
        .add(Step::from_to(title, title_from, title_to).delay(800.0))
        .add(Step::from_to(subtitle, from, to).position(overlap))
        .add(Step::from_to(description, from, to).position(overlap))
        .add(Step::from_to(buttons, from, to).position(overlap))
        .add(Step::from_to(social, from, to).position(overlap))
        .play();

        // Endless float, independent of scrolling
        runtime::run_transition(
            image,
            None,
            VisualState::new().y(15.0),
            Transition::new(2000.0, TimingFunction::Power(1, EaseDirection::InOut))
                .repeat(Repeat::Forever)
                .yoyo(true),
        );
    });

    Section {
        kind: SectionKind::Hero,
        root,
        heading: title,
        heading_units: Vec::new(),
        parts: vec![subtitle, description, buttons, social, image],
        items: Vec::new(),
        item_decor: Vec::new(),
        scope,
    }
}

fn mount_about(main: ElementId, layout: &mut Layout) -> Section {
    let rect = layout.section(900.0);
    let root = child(main, rect);
    let heading = child(root, Layout::heading(&rect));
    runtime::set_element_text(heading, ABOUT_HEADING);
    let half = rect.width / 2.0;
    let image = child(root, Rect::new(rect.x, rect.y + 200.0, half, 480.0));
    let body = child(root, Rect::new(rect.x + half, rect.y + 200.0, half, 520.0));

    let scope = open_scope(root);
    let heading_units = scope.run(|| {
        // Units must exist before the staggered reveal is registered
        let units = runtime::split_heading(heading, ABOUT_HEADING);
        Reveal::from_to(
            units.iter().copied(),
            VisualState::new().opacity(0.0).y(20.0),
            VisualState::new().opacity(1.0).y(0.0),
        )
        .duration(500.0)
        .stagger(30.0)
        .scroll_trigger(heading)
        .play();

        let (from, to) = slide_in(-50.0);
        Reveal::from_to([image], from, to)
            .duration(1000.0)
            .scroll_trigger(image)
            .play();

        let (from, to) = slide_in(50.0);
        Reveal::from_to([body], from, to)
            .duration(1000.0)
            .scroll_trigger(body)
            .play();
        units
    });

    Section {
        kind: SectionKind::About,
        root,
        heading,
        heading_units,
        parts: vec![image, body],
        items: Vec::new(),
        item_decor: Vec::new(),
        scope,
    }
}

/// Heading plus a staggered grid of cards.
fn mount_card_grid(
    kind: SectionKind,
    main: ElementId,
    layout: &mut Layout,
    count: usize,
    columns: usize,
    card_height: f32,
    stagger_ms: f32,
) -> Section {
    let rows = count.div_ceil(columns.max(1)) as f32;
    let rect = layout.section(220.0 + rows * (card_height + 32.0) + SECTION_PADDING);
    let root = child(main, rect);
    let heading = child(root, Layout::heading(&rect));
    let grid_top = rect.y + 220.0;
    let grid = child(
        root,
        Rect::new(rect.x, grid_top, rect.width, rows * (card_height + 32.0)),
    );
    let items: Vec<ElementId> = Layout::grid(&rect, grid_top, count, columns, card_height)
        .into_iter()
        .map(|cell| child(grid, cell))
        .collect();

    let scope = open_scope(root);
    scope.run(|| {
        heading_reveal(heading);
        let (from, to) = fade_up(50.0);
        Reveal::from_to(items.iter().copied(), from, to)
            .duration(800.0)
            .stagger(stagger_ms)
            .scroll_trigger(grid)
            .play();
    });

    Section {
        kind,
        root,
        heading,
        heading_units: Vec::new(),
        parts: vec![grid],
        items,
        item_decor: Vec::new(),
        scope,
    }
}

fn mount_projects(main: ElementId, layout: &mut Layout, count: usize) -> Section {
    mount_card_grid(SectionKind::Projects, main, layout, count, 3, 560.0, 200.0)
}

fn mount_skills(main: ElementId, layout: &mut Layout, count: usize) -> Section {
    mount_card_grid(SectionKind::Skills, main, layout, count, 3, 260.0, 150.0)
}

fn mount_tech_stack(main: ElementId, layout: &mut Layout, content: &SiteContent) -> Section {
    let count = content.technologies.len();
    let columns = 6;
    let tile = 140.0;
    let rows = count.div_ceil(columns) as f32;
    let rect = layout.section(200.0 + rows * (tile + 32.0) + SECTION_PADDING);
    let root = child(main, rect);
    let heading = child(root, Layout::heading(&rect));
    let grid_top = rect.y + 200.0;
    let grid = child(
        root,
        Rect::new(rect.x, grid_top, rect.width, rows * (tile + 32.0)),
    );

    let mut items = Vec::with_capacity(count);
    let mut item_decor = Vec::with_capacity(count);
    for cell in Layout::grid(&rect, grid_top, count, columns, tile) {
        let item = child(grid, cell);
        let image = child(
            item,
            Rect::new(cell.x + 30.0, cell.y + 16.0, cell.width - 60.0, 80.0),
        );
        items.push(item);
        item_decor.push(image);
    }

    let scope = open_scope(root);
    scope.run(|| {
        heading_reveal(heading);
        Reveal::from_to(
            items.iter().copied(),
            VisualState::new().opacity(0.0).scale(0.8),
            VisualState::new().opacity(1.0).scale(1.0),
        )
        .duration(500.0)
        .stagger(100.0)
        .scroll_trigger(grid)
        .play();

        let lift = Transition::new(300.0, TimingFunction::Power(2, EaseDirection::Out));
        let wobble = Transition::new(400.0, TimingFunction::ElasticOut(1.0, 0.3));
        for ((tech, &item), &image) in content.technologies.iter().zip(&items).zip(&item_decor) {
            runtime::register_hover(
                tech_hover_key(&tech.name),
                vec![
                    HoverEffect::new(
                        item,
                        VisualState::new().y(-10.0).scale(1.05),
                        VisualState::new().y(0.0).scale(1.0),
                        lift.clone(),
                    ),
                    HoverEffect::new(
                        image,
                        VisualState::new().rotation(5.0),
                        VisualState::new().rotation(0.0),
                        wobble.clone(),
                    )
                    .leave_transition(lift.clone()),
                ],
            );
        }
    });

    Section {
        kind: SectionKind::TechStack,
        root,
        heading,
        heading_units: Vec::new(),
        parts: vec![grid],
        items,
        item_decor,
        scope,
    }
}

fn mount_contact(main: ElementId, layout: &mut Layout) -> Section {
    let rect = layout.section(900.0);
    let root = child(main, rect);
    let heading = child(root, Layout::heading(&rect));
    let container = child(
        root,
        Rect::new(rect.x, rect.y + 200.0, rect.width, 600.0),
    );
    let half = rect.width / 2.0;
    let info = child(container, Rect::new(rect.x, rect.y + 200.0, half, 400.0));
    let form = child(
        container,
        Rect::new(rect.x + half, rect.y + 200.0, half, 600.0),
    );

    let scope = open_scope(root);
    scope.run(|| {
        heading_reveal(heading);
        let (from, to) = slide_in(-50.0);
        Reveal::from_to([info], from, to)
            .duration(800.0)
            .scroll_trigger(container)
            .play();
        let (from, to) = slide_in(50.0);
        Reveal::from_to([form], from, to)
            .duration(800.0)
            .scroll_trigger(container)
            .play();
        runtime::refresh(runtime::now());
    });

    Section {
        kind: SectionKind::Contact,
        root,
        heading,
        heading_units: Vec::new(),
        parts: vec![container, info, form],
        items: Vec::new(),
        item_decor: Vec::new(),
        scope,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::Property;
    use crate::runtime::element_value;

    fn mounted() -> Page {
        Page::mount(SiteContent::embedded().unwrap())
    }

    fn later(ms: u64) -> Instant {
        runtime::now() + Duration::from_millis(ms)
    }

    #[test]
    fn test_mount_lays_out_every_section() {
        let page = mounted();
        assert_eq!(page.sections.len(), SectionKind::ALL.len());
        assert_eq!(page.section(SectionKind::Projects).unwrap().items.len(), 3);
        assert_eq!(page.section(SectionKind::Skills).unwrap().items.len(), 6);
        let tech = page.section(SectionKind::TechStack).unwrap();
        assert_eq!(tech.items.len(), 12);
        assert_eq!(tech.item_decor.len(), 12);

        let about = page.section(SectionKind::About).unwrap();
        assert_eq!(about.heading_units.len(), ABOUT_HEADING.chars().count());
        assert!(runtime::element_text(about.heading).is_none());
    }

    #[test]
    fn test_hero_plays_without_scrolling() {
        let page = mounted();
        let hero = page.section(SectionKind::Hero).unwrap();
        assert_eq!(element_value(hero.heading, Property::Opacity), Some(0.0));

        // The first frame arrives long after mount; the timeline starts there
        let first_frame = later(5000);
        runtime::tick(first_frame);
        assert_eq!(element_value(hero.heading, Property::Opacity), Some(0.0));

        runtime::tick(first_frame + Duration::from_millis(5000));
        assert_eq!(element_value(hero.heading, Property::Opacity), Some(1.0));
        for &line in &hero.parts[..4] {
            assert_eq!(element_value(line, Property::Opacity), Some(1.0));
            assert_eq!(element_value(line, Property::Y), Some(0.0));
        }
        // The floating image never settles
        assert!(runtime::tick(later(1000)));
    }

    #[test]
    fn test_project_cards_wait_for_scroll() {
        let mut page = mounted();
        let cards = page.section(SectionKind::Projects).unwrap().items.clone();
        runtime::tick(later(100));
        assert_eq!(element_value(cards[0], Property::Opacity), Some(0.0));
        assert_eq!(element_value(cards[0], Property::Y), Some(50.0));

        let start = later(0);
        page.scroll_to(1500.0, start);
        assert!(page.header.scrolled);
        page.tick(start + Duration::from_millis(1500));
        for &card in &cards {
            assert_eq!(element_value(card, Property::Opacity), Some(1.0));
            assert_eq!(element_value(card, Property::Y), Some(0.0));
        }
    }

    #[test]
    fn test_tech_hover_lifts_and_returns() {
        let mut page = mounted();
        let tech = page.section(SectionKind::TechStack).unwrap();
        let (item, image) = (tech.items[0], tech.item_decor[0]);

        let start = later(0);
        page.tick(start);
        // Pointer arrives after two idle seconds
        let enter = start + Duration::from_millis(2000);
        page.hover_technology("React", enter);
        page.tick(enter + Duration::from_millis(150));
        let y = element_value(item, Property::Y).unwrap();
        assert!(y < 0.0 && y > -10.0, "y = {}", y);

        page.tick(enter + Duration::from_millis(500));
        assert_eq!(element_value(item, Property::Y), Some(-10.0));
        assert_eq!(element_value(item, Property::Scale), Some(1.05));

        page.leave_technology("React", enter + Duration::from_millis(500));
        page.tick(enter + Duration::from_millis(1000));
        assert_eq!(element_value(item, Property::Y), Some(0.0));
        assert_eq!(element_value(image, Property::Rotation), Some(0.0));
    }

    #[test]
    fn test_navigate_scrolls_to_anchor() {
        let mut page = mounted();
        page.header.toggle_menu();
        assert!(page.navigate("#about", later(0)));
        assert!(!page.header.menu_open);
        assert_eq!(with_stage(|stage| stage.viewport().scroll_y), 800.0);
        assert!(!page.navigate("#nowhere", later(0)));
    }

    #[test]
    fn test_unmount_revokes_everything() {
        let mut page = mounted();
        assert!(runtime::trigger_count() > 0);

        page.unmount();
        assert!(!page.is_mounted());
        assert_eq!(runtime::trigger_count(), 0);
        assert!(!runtime::tick(later(10_000)));

        let cards = page.section(SectionKind::Projects).unwrap().items.clone();
        page.scroll_to(2000.0, later(10_000));
        page.tick(later(20_000));
        assert_eq!(element_value(cards[0], Property::Opacity), Some(0.0));

        page.unmount();
    }
}
