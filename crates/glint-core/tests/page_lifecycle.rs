//! End-to-end page behavior against the in-memory surface.
//!
//! Run:
//!   cargo test -p glint-core --test page_lifecycle

use std::time::Duration;

use glint_core::binder::Signal;
use glint_core::config::Span;
use glint_core::page::ANIMATION_DURATION_VAR;
use glint_core::testing::{FakeNode, FakeSurface};
use glint_core::theme::{ACCENT_VAR, PRIMARY_VAR, SECONDARY_VAR};
use glint_core::{ConfigError, EffectSurface, Page, PageConfig, PageEvent, Phase, Point, Rect, ThemeId};
use pretty_assertions::assert_eq;

const SEED: u64 = 0x5eed;

struct Fixture {
    surface: FakeSurface,
    container: FakeNode,
    heading: FakeNode,
    icon: FakeNode,
    button: FakeNode,
    page: Page<FakeSurface>,
}

/// A page with a container holding a heading, the icon (centered on
/// (100, 100)) and one button.
fn fixture() -> Fixture {
    let surface = FakeSurface::new();
    let container = surface.add_element(None, "div", &["container"]);
    let heading = surface.add_element(Some(container), "h1", &[]);
    let icon = surface.add_element(Some(container), "div", &["apple-icon"]);
    surface.set_rect(icon, Rect::new(80.0, 80.0, 40.0, 40.0));
    let button = surface.add_element(Some(container), "button", &[]);
    surface.set_rect(button, Rect::new(10.0, 10.0, 120.0, 40.0));
    let page = Page::new(surface.clone(), PageConfig::default())
        .expect("default config is valid")
        .with_seed(SEED);
    Fixture {
        surface,
        container,
        heading,
        icon,
        button,
        page,
    }
}

fn ready() -> Fixture {
    let mut fx = fixture();
    fx.page.on_ready();
    fx
}

fn toggle(fx: &Fixture) -> FakeNode {
    fx.surface
        .query(".theme-toggle")
        .expect("theme toggle is created at startup")
}

fn key(key: &str, focused: Option<FakeNode>) -> PageEvent<FakeNode> {
    PageEvent::KeyDown {
        key: key.to_string(),
        focused,
    }
}

/// Parse `translate(Xpx, Ypx) scale(0)`.
fn parse_translate(transform: &str) -> (f64, f64) {
    let inner = transform
        .strip_prefix("translate(")
        .and_then(|rest| rest.split(')').next())
        .expect("translate() transform");
    let mut parts = inner.split(", ").map(|p| {
        p.trim_end_matches("px")
            .parse::<f64>()
            .expect("numeric translate component")
    });
    (parts.next().unwrap(), parts.next().unwrap())
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn startup_creates_theme_toggle() {
    let fx = ready();
    let toggle = toggle(&fx);
    assert_eq!(fx.surface.parent(toggle), fx.surface.body());
    assert_eq!(fx.surface.text(toggle).as_deref(), Some("\u{1F3A8}"));
    assert_eq!(
        fx.surface.attribute(toggle, "aria-label").as_deref(),
        Some("Change color theme")
    );
    assert_eq!(fx.surface.style(toggle, "position").as_deref(), Some("fixed"));
    assert_eq!(fx.page.phase(), Phase::Ready);
}

#[test]
fn startup_plan_lists_listeners_once_per_node_and_signal() {
    let mut fx = fixture();
    let plan = fx.page.on_ready();
    let toggle = toggle(&fx);

    let on = |node: FakeNode| -> Vec<Signal> {
        plan.bindings
            .iter()
            .filter(|b| b.node == node)
            .map(|b| b.signal)
            .collect()
    };
    assert_eq!(
        on(fx.icon),
        vec![
            Signal::Click,
            Signal::PointerEnter,
            Signal::PointerLeave,
            Signal::Focus,
            Signal::Blur
        ]
    );
    assert_eq!(on(fx.button), vec![Signal::Click, Signal::Focus, Signal::Blur]);
    assert_eq!(
        on(toggle),
        vec![
            Signal::Click,
            Signal::PointerEnter,
            Signal::PointerLeave,
            Signal::Focus,
            Signal::Blur
        ]
    );
    assert!(plan.keyboard);
    assert!(plan.float_loop);
    assert_eq!(plan.observe, vec![fx.container, fx.heading, fx.icon]);
}

#[test]
fn second_on_ready_is_a_no_op() {
    let mut fx = ready();
    let plan = fx.page.on_ready();
    assert!(plan.bindings.is_empty());
    assert_eq!(fx.surface.query_all(".theme-toggle").len(), 1);
}

#[test]
fn events_before_ready_are_ignored() {
    let mut fx = fixture();
    let outcome = fx.page.handle(key("T", None));
    assert_eq!(outcome.handled, 0);
    assert_eq!(fx.page.theme().index(), 0);
    assert!(!fx.page.float_frame());
}

#[test]
fn theme_is_not_applied_until_requested() {
    let fx = ready();
    assert!(fx.surface.root_history(PRIMARY_VAR).is_empty());
    assert_eq!(fx.page.current_theme(), ThemeId::ClassicBlue.profile());
}

// ============================================================================
// Sparkles
// ============================================================================

#[test]
fn icon_click_bursts_eight_sparkles_and_all_self_remove() {
    let mut fx = ready();
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });

    let sparkles = fx.surface.query_all(".sparkle");
    assert_eq!(sparkles.len(), 8);
    for &node in &sparkles {
        assert_eq!(fx.surface.parent(node), fx.surface.body());
        assert_eq!(fx.surface.style(node, "left").as_deref(), Some("100px"));
        assert_eq!(fx.surface.style(node, "top").as_deref(), Some("100px"));
        assert_eq!(fx.surface.style(node, "position").as_deref(), Some("fixed"));
    }

    let records: Vec<_> = fx
        .surface
        .animations()
        .into_iter()
        .filter(|r| sparkles.contains(&r.node))
        .collect();
    assert_eq!(records.len(), 8);

    let mut angles = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let anim = &record.animation;
        assert_eq!(anim.from.opacity, 1.0);
        assert_eq!(anim.from.transform, "translate(0, 0) scale(1)");
        assert_eq!(anim.to.opacity, 0.0);
        assert!(anim.to.transform.ends_with("scale(0)"));

        let (dx, dy) = parse_translate(&anim.to.transform);
        let distance = dx.hypot(dy);
        assert!((50.0 - 1e-9..=80.0 + 1e-9).contains(&distance), "distance {distance}");
        let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
        let expected = i as f64 * 45.0;
        let diff = (angle - expected).abs();
        assert!(diff < 1e-6 || (360.0 - diff) < 1e-6, "particle {i}: angle {angle}");
        angles.push(angle.round() as i64);

        let ms = anim.duration.as_secs_f64() * 1000.0;
        assert!((800.0 - 1e-6..=1200.0 + 1e-6).contains(&ms), "duration {ms}");
    }
    angles.sort_unstable();
    angles.dedup();
    assert_eq!(angles.len(), 8, "every particle has a distinct angle");

    fx.surface.advance(Duration::from_millis(1200));
    assert!(fx.surface.query_all(".sparkle").is_empty());
    let removals = fx.surface.removals();
    for record in &records {
        let (_, removed_at) = removals
            .iter()
            .find(|(node, _)| *node == record.node)
            .expect("sparkle removed");
        assert_eq!(*removed_at - record.started_at, record.animation.duration);
    }
}

#[test]
fn icon_click_restarts_bounce_with_layout_flush() {
    let mut fx = ready();
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    assert_eq!(
        fx.surface.style_history(fx.icon, "animation"),
        vec!["none".to_string(), "appleBounce 0.6s ease-out".to_string()]
    );
    assert_eq!(fx.surface.layout_reads(fx.icon), 1);
}

#[test]
fn every_spawned_effect_completes_exactly_once() {
    let mut fx = ready();
    for _ in 0..3 {
        fx.page.handle(PageEvent::Click {
            target: fx.icon,
            point: Point::new(95.0, 105.0),
        });
    }
    let stats = fx.page.effect_stats().unwrap().clone();
    // 3 x (8 sparkles + 1 ripple)
    assert_eq!(stats.spawned(), 27);
    assert_eq!(stats.in_flight(), 27);

    fx.surface.advance(Duration::from_secs(2));
    assert_eq!(stats.completed(), 27);
    assert_eq!(stats.in_flight(), 0);
    assert_eq!(fx.surface.removals().len(), 27);
    assert_eq!(fx.surface.pending_tasks(), 0);
}

// ============================================================================
// Ripples
// ============================================================================

#[test]
fn button_click_ripples_centered_on_pointer() {
    let mut fx = ready();
    let outcome = fx.page.handle(PageEvent::Click {
        target: fx.button,
        point: Point::new(70.0, 30.0),
    });
    assert_eq!(outcome.handled, 1);
    assert_eq!(outcome.failed, 0);

    let ripples = fx.surface.children(fx.button);
    assert_eq!(ripples.len(), 1);
    let ripple = ripples[0];
    assert_eq!(fx.surface.classes(ripple), vec!["ripple".to_string()]);
    assert_eq!(fx.surface.style(ripple, "width").as_deref(), Some("120px"));
    assert_eq!(fx.surface.style(ripple, "height").as_deref(), Some("120px"));
    assert_eq!(fx.surface.style(ripple, "left").as_deref(), Some("0px"));
    assert_eq!(fx.surface.style(ripple, "top").as_deref(), Some("-40px"));
    assert_eq!(
        fx.surface.style(fx.button, "position").as_deref(),
        Some("relative")
    );

    let record = fx
        .surface
        .animations()
        .into_iter()
        .find(|r| r.node == ripple)
        .unwrap();
    assert_eq!(record.animation.from.transform, "scale(0)");
    assert_eq!(record.animation.from.opacity, 0.6);
    assert_eq!(record.animation.to.transform, "scale(2)");
    assert_eq!(record.animation.to.opacity, 0.0);
    assert_eq!(record.animation.easing.to_string(), "ease-out");

    fx.surface.advance(Duration::from_millis(599));
    assert!(fx.surface.is_attached(&ripple));
    fx.surface.advance(Duration::from_millis(1));
    assert!(!fx.surface.is_attached(&ripple));
}

#[test]
fn positioned_target_keeps_its_position() {
    let mut fx = ready();
    fx.surface.set_computed_position(fx.button, "absolute");
    fx.page.handle(PageEvent::Click {
        target: fx.button,
        point: Point::new(20.0, 20.0),
    });
    assert!(fx.surface.style_history(fx.button, "position").is_empty());
}

#[test]
fn theme_toggle_click_does_not_ripple() {
    let mut fx = ready();
    let toggle = toggle(&fx);
    fx.page.handle(PageEvent::Click {
        target: toggle,
        point: Point::new(0.0, 0.0),
    });
    assert!(fx.surface.query_all(".ripple").is_empty());
}

// ============================================================================
// Theme
// ============================================================================

#[test]
fn five_t_presses_cycle_theme_and_write_root_colors() {
    let mut fx = ready();
    let mut indices = Vec::new();
    for key_name in ["T", "t", "T", "t", "T"] {
        fx.page.handle(key(key_name, None));
        indices.push(fx.page.theme().index());
    }
    assert_eq!(indices, vec![1, 2, 3, 0, 1]);

    let expected = [
        ThemeId::Warm,
        ThemeId::FreshGreen,
        ThemeId::PurplePink,
        ThemeId::ClassicBlue,
        ThemeId::Warm,
    ];
    let primaries: Vec<String> = expected
        .iter()
        .map(|id| id.profile().primary.to_string())
        .collect();
    let secondaries: Vec<String> = expected
        .iter()
        .map(|id| id.profile().secondary.to_string())
        .collect();
    let accents: Vec<String> = expected
        .iter()
        .map(|id| id.profile().accent.to_string())
        .collect();
    assert_eq!(fx.surface.root_history(PRIMARY_VAR), primaries);
    assert_eq!(fx.surface.root_history(SECONDARY_VAR), secondaries);
    assert_eq!(fx.surface.root_history(ACCENT_VAR), accents);
}

#[test]
fn theme_apply_updates_container_and_body() {
    let mut fx = ready();
    fx.page.handle(key("t", None));
    assert_eq!(
        fx.surface.style(fx.container, "background").as_deref(),
        Some("linear-gradient(135deg, #FF3B3020, #FF950020)")
    );
    let body = fx.surface.body().unwrap();
    assert_eq!(
        fx.surface.style(body, "transition").as_deref(),
        Some("all 0.5s ease")
    );
}

#[test]
fn toggle_press_reverts_after_150ms() {
    let mut fx = ready();
    let toggle = toggle(&fx);
    fx.page.handle(PageEvent::Click {
        target: toggle,
        point: Point::new(0.0, 0.0),
    });
    assert_eq!(
        fx.surface.style(toggle, "transform").as_deref(),
        Some("scale(0.9) rotate(180deg)")
    );
    fx.surface.advance(Duration::from_millis(149));
    assert_eq!(
        fx.surface.style(toggle, "transform").as_deref(),
        Some("scale(0.9) rotate(180deg)")
    );
    fx.surface.advance(Duration::from_millis(1));
    assert_eq!(
        fx.surface.style(toggle, "transform").as_deref(),
        Some("scale(1) rotate(0deg)")
    );
}

#[test]
fn four_advances_return_to_original_palette() {
    let mut fx = ready();
    let original = fx.page.current_theme();
    for _ in 0..4 {
        fx.page.handle(key("T", None));
    }
    assert_eq!(fx.page.current_theme(), original);
}

// ============================================================================
// Keyboard, hover, focus
// ============================================================================

#[test]
fn enter_on_focused_icon_activates_it() {
    let mut fx = ready();
    let outcome = fx.page.handle(key("Enter", Some(fx.icon)));
    assert!(outcome.prevent_default);
    assert_eq!(outcome.handled, 2, "icon click and ripple");
    assert_eq!(fx.surface.query_all(".sparkle").len(), 8);
}

#[test]
fn space_on_focused_icon_activates_it() {
    let mut fx = ready();
    let outcome = fx.page.handle(key(" ", Some(fx.icon)));
    assert!(outcome.prevent_default);
    assert_eq!(fx.surface.query_all(".sparkle").len(), 8);
}

#[test]
fn enter_elsewhere_does_nothing() {
    let mut fx = ready();
    let outcome = fx.page.handle(key("Enter", Some(fx.button)));
    assert!(!outcome.prevent_default);
    assert_eq!(outcome.handled, 0);
    let unfocused = fx.page.handle(key("Enter", None));
    assert_eq!(unfocused.handled, 0);
    assert!(fx.surface.query_all(".sparkle").is_empty());
}

#[test]
fn icon_hover_switches_filter_presets() {
    let mut fx = ready();
    fx.page.handle(PageEvent::PointerEnter(fx.icon));
    assert_eq!(
        fx.surface.style(fx.icon, "filter").as_deref(),
        Some("brightness(1.2) drop-shadow(0 0 20px rgba(255, 255, 255, 0.5))")
    );
    fx.page.handle(PageEvent::PointerLeave(fx.icon));
    assert_eq!(
        fx.surface.style(fx.icon, "filter").as_deref(),
        Some("brightness(1) drop-shadow(0 4px 8px rgba(0, 0, 0, 0.3))")
    );
}

#[test]
fn toggle_hover_scales_and_brightens() {
    let mut fx = ready();
    let toggle = toggle(&fx);
    fx.page.handle(PageEvent::PointerEnter(toggle));
    assert_eq!(fx.surface.style(toggle, "transform").as_deref(), Some("scale(1.1)"));
    assert_eq!(
        fx.surface.style(toggle, "background").as_deref(),
        Some("rgba(255, 255, 255, 0.3)")
    );
    fx.page.handle(PageEvent::PointerLeave(toggle));
    assert_eq!(fx.surface.style(toggle, "transform").as_deref(), Some("scale(1)"));
}

#[test]
fn focus_outline_on_and_off() {
    let mut fx = ready();
    for node in [fx.button, fx.icon, toggle(&fx)] {
        fx.page.handle(PageEvent::Focus(node));
        assert_eq!(
            fx.surface.style(node, "outline").as_deref(),
            Some("3px solid #007AFF")
        );
        assert_eq!(fx.surface.style(node, "outline-offset").as_deref(), Some("2px"));
        fx.page.handle(PageEvent::Blur(node));
        assert_eq!(fx.surface.style(node, "outline").as_deref(), Some("none"));
    }
}

#[test]
fn focus_on_unbound_element_is_ignored() {
    let mut fx = ready();
    let outcome = fx.page.handle(PageEvent::Focus(fx.heading));
    assert_eq!(outcome.handled, 0);
    assert_eq!(fx.surface.style(fx.heading, "outline"), None);
}

// ============================================================================
// Float and reduced motion
// ============================================================================

#[test]
fn float_runs_from_startup() {
    let mut fx = ready();
    assert_eq!(
        fx.surface.style(fx.icon, "transform").as_deref(),
        Some("translateY(0.5px)")
    );
    for _ in 0..19 {
        assert!(fx.page.float_frame());
    }
    assert_eq!(fx.page.float().unwrap().offset(), 10.0);
    assert_eq!(
        fx.surface.style(fx.icon, "transform").as_deref(),
        Some("translateY(10px)")
    );
}

#[test]
fn reduced_motion_never_starts_float() {
    let mut fx = fixture();
    fx.surface.set_reduced_motion(true);
    let plan = fx.page.on_ready();

    assert!(!plan.float_loop);
    assert!(fx.page.reduced_motion());
    assert!(fx.page.float().is_none());
    for _ in 0..10 {
        assert!(!fx.page.float_frame());
    }
    assert!(fx.surface.style_history(fx.icon, "transform").is_empty());
    assert_eq!(fx.surface.style(fx.icon, "animation").as_deref(), Some("none"));
    assert_eq!(
        fx.surface.root_property(ANIMATION_DURATION_VAR).as_deref(),
        Some("0.1s")
    );
}

#[test]
fn reduced_motion_keeps_other_effects() {
    let mut fx = fixture();
    fx.surface.set_reduced_motion(true);
    fx.page.on_ready();
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    assert_eq!(fx.surface.query_all(".sparkle").len(), 8);
}

// ============================================================================
// Visibility markers
// ============================================================================

#[test]
fn visibility_marker_is_one_shot() {
    let mut fx = ready();
    assert!(fx.page.on_visible(&fx.icon));
    assert!(fx.surface.classes(fx.icon).contains(&"animate-in".to_string()));
    assert!(!fx.page.on_visible(&fx.icon));
    assert_eq!(
        fx.surface
            .classes(fx.icon)
            .iter()
            .filter(|c| *c == "animate-in")
            .count(),
        1
    );
    assert_eq!(fx.page.visibility().pending(), &[fx.container, fx.heading]);
}

#[test]
fn unobserved_element_is_not_marked() {
    let mut fx = ready();
    assert!(!fx.page.on_visible(&fx.button));
    assert!(fx.surface.classes(fx.button).is_empty());
}

// ============================================================================
// Teardown and absent elements
// ============================================================================

#[test]
fn teardown_sweeps_effects_still_in_flight() {
    let mut fx = ready();
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    fx.surface.advance(Duration::from_millis(100));
    assert_eq!(fx.page.teardown(), 9, "8 sparkles + 1 ripple");
    assert!(fx.surface.query_all(".sparkle, .ripple").is_empty());
    assert_eq!(fx.page.phase(), Phase::TornDown);

    // Late completions find their nodes already gone.
    fx.surface.advance(Duration::from_secs(2));
    assert_eq!(fx.surface.removals().len(), 9);

    let outcome = fx.page.handle(key("T", None));
    assert_eq!(outcome.handled, 0);
    assert!(!fx.page.float_frame());
    assert_eq!(fx.page.teardown(), 0);
}

#[test]
fn unload_sweep_keeps_page_running() {
    let mut fx = ready();
    assert!(fx.page.float_frame());
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    fx.surface.advance(Duration::from_millis(100));

    assert_eq!(fx.page.sweep_effects(), 9);
    assert!(fx.surface.query_all(".sparkle, .ripple").is_empty());
    assert_eq!(fx.page.phase(), Phase::Ready);

    assert!(fx.page.float_frame());
    let outcome = fx.page.handle(key("T", None));
    assert!(outcome.handled > 0);
    assert_eq!(fx.page.theme().index(), 1);

    // New effects still spawn and clean themselves up.
    fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    assert_eq!(fx.surface.query_all(".sparkle").len(), 8);
    fx.surface.advance(Duration::from_secs(2));
    assert!(fx.surface.query_all(".sparkle, .ripple").is_empty());
    assert_eq!(fx.surface.removals().len(), 18);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = PageConfig::default();
    config.sparkle.distance = Span::new(80.0, 50.0);
    let result = Page::new(FakeSurface::new(), config);
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "sparkle.distance",
            ..
        })
    ));
}

#[test]
fn bare_document_still_gets_theme_toggle() {
    let surface = FakeSurface::new();
    let mut page = Page::new(surface.clone(), PageConfig::default())
        .expect("default config is valid")
        .with_seed(SEED);
    let plan = page.on_ready();
    assert!(!plan.float_loop);
    assert!(plan.observe.is_empty());

    assert_eq!(page.handle(key("Enter", None)).handled, 0);
    page.handle(key("T", None));
    assert_eq!(page.theme().index(), 1);
    assert_eq!(surface.root_property(PRIMARY_VAR).as_deref(), Some("#FF3B30"));
}

#[test]
fn document_without_body_degrades_silently() {
    let surface = FakeSurface::without_body();
    let mut page = Page::new(surface.clone(), PageConfig::default())
        .expect("default config is valid")
        .with_seed(SEED);
    let plan = page.on_ready();
    assert!(plan.bindings.is_empty());
    assert_eq!(page.handle(key("T", None)).handled, 0);
    assert_eq!(page.theme().index(), 0);
    assert_eq!(page.teardown(), 0);
}

#[test]
fn failing_animation_leaves_no_orphans() {
    let mut fx = ready();
    fx.surface.fail_animations(true);
    let outcome = fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    assert_eq!(outcome.handled, 2);
    assert_eq!(outcome.failed, 2);
    assert!(fx.surface.query_all(".sparkle, .ripple").is_empty());
    let stats = fx.page.effect_stats().unwrap();
    assert_eq!(stats.in_flight(), 0);
}

#[test]
fn failing_handler_does_not_block_others() {
    let mut fx = ready();
    fx.surface.fail_style("animation");
    let outcome = fx.page.handle(PageEvent::Click {
        target: fx.icon,
        point: Point::new(100.0, 100.0),
    });
    assert_eq!(outcome.handled, 2);
    assert_eq!(outcome.failed, 1, "bounce fails, ripple still runs");
    assert_eq!(fx.surface.query_all(".ripple").len(), 1);

    // Unrelated features keep working.
    fx.page.handle(key("T", None));
    assert_eq!(fx.page.theme().index(), 1);
}
