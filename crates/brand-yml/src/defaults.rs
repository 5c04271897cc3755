//! Default values for unset typography fields.
//!
//! Rules run once, after every explicit value has been built and every
//! reference resolved, in this order:
//!
//! 1. `monospace-inline` and `monospace-block` take `family`, `style`,
//!    `weight` and `size` from `monospace` where unset.
//! 2. `headings` takes `family` from `base` where unset.
//! 3. `link.color` defaults to the `primary` theme color.
//! 4. Every role with a family is linked to that family's source from
//!    `fonts`, or to [`FontSource::System`] when the family is not declared.
//!
//! Rules only copy values that are already concrete, so they never introduce
//! an unresolved reference. Theme roles are never defaulted; an unset role
//! means "use the renderer's default".

use crate::model::{FontSource, ThemeColors, Typography, TypographyRole};

/// Applies every default rule to `typography`.
pub(crate) fn apply(typography: &mut Typography, theme: &ThemeColors) {
    inherit_monospace(typography);
    inherit_headings(typography);
    default_link_color(typography, theme);
    link_font_sources(typography);
}

fn inherit_monospace(typography: &mut Typography) {
    let parent = typography.monospace.clone();
    for child in [
        &mut typography.monospace_inline,
        &mut typography.monospace_block,
    ] {
        fill(&mut child.family, &parent.family);
        fill(&mut child.style, &parent.style);
        fill(&mut child.weight, &parent.weight);
        fill(&mut child.size, &parent.size);
    }
}

fn inherit_headings(typography: &mut Typography) {
    let family = typography.base.family.clone();
    fill(&mut typography.headings.family, &family);
}

fn default_link_color(typography: &mut Typography, theme: &ThemeColors) {
    fill(&mut typography.link.color, &theme.primary);
}

fn link_font_sources(typography: &mut Typography) {
    for name in Typography::ROLES {
        let source = typography
            .role(name)
            .and_then(|role| role.family.as_deref())
            .map(|family| match typography.font(family) {
                Some(font) => font.source.clone(),
                None => FontSource::System,
            });
        if let Some(role) = typography.role_mut(name) {
            link(role, source);
        }
    }
}

fn link(role: &mut TypographyRole, source: Option<FontSource>) {
    if role.source.is_none() {
        role.source = source;
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, fallback: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(fallback);
    }
}
