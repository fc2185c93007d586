//! FILENAME: core/view-engine/src/materialize.rs
//! Viewable Materializer - turns ordered rows into a layout-specific viewable.
//!
//! Pure dispatch over the three layouts. Row order is preserved exactly; the
//! header is filled with the view's identity and left for the caller to
//! adjust when materializing a group.

use attrview::{CoverFrom, Key, LayoutType, ValueData, View};

use crate::index::{RowIndex, RowPos};
use crate::viewable::{
    CalcResult, Card, CardField, GalleryViewable, KanbanViewable, TableColumn, TableRow,
    TableViewable, ViewCell, Viewable, ViewableHeader,
};

/// Materializes `rows` (already filtered and ordered) for `layout`.
pub fn materialize(
    layout: LayoutType,
    view: &View,
    index: &RowIndex<'_>,
    rows: &[RowPos],
    calcs: Vec<CalcResult>,
) -> Viewable {
    let header = ViewableHeader {
        id: view.id.clone(),
        name: view.name.clone(),
        icon: view.icon.clone(),
        ..ViewableHeader::default()
    };

    match layout {
        LayoutType::Table => {
            let columns = table_columns(view, index);
            let visible: Vec<&Key> = columns.iter().filter(|c| !c.hidden).map(|c| &c.key).collect();
            let rows: Vec<TableRow> = rows
                .iter()
                .map(|&pos| TableRow {
                    id: index.row_id(pos).to_string(),
                    cells: cells_of(index, &visible, pos),
                })
                .collect();
            Viewable::Table(TableViewable {
                header,
                columns,
                row_count: rows.len(),
                rows,
                calcs,
            })
        }
        LayoutType::Gallery => {
            let fields = card_fields(view, index);
            let cards = cards_of(view, index, &fields, rows, true);
            Viewable::Gallery(GalleryViewable {
                header,
                fields,
                card_count: cards.len(),
                cards,
                cover_from: view.cards.cover_from,
                calcs,
            })
        }
        LayoutType::Kanban => {
            let fields = card_fields(view, index);
            let cards = cards_of(view, index, &fields, rows, false);
            Viewable::Kanban(KanbanViewable {
                header,
                fields,
                card_count: cards.len(),
                cards,
                calcs,
            })
        }
    }
}

/// Keys in view field order, followed by keys the view has no settings for.
fn ordered_keys<'a>(view: &View, index: &RowIndex<'a>) -> Vec<&'a Key> {
    let mut keys: Vec<&'a Key> = view.fields.iter().filter_map(|f| index.key(&f.key_id)).collect();
    for key in index.keys() {
        if view.field(&key.id).is_none() {
            keys.push(key);
        }
    }
    keys
}

fn table_columns(view: &View, index: &RowIndex<'_>) -> Vec<TableColumn> {
    ordered_keys(view, index)
        .into_iter()
        .map(|key| {
            let field = view.field(&key.id);
            TableColumn {
                key: key.clone(),
                hidden: field.map_or(false, |f| f.hidden),
                width: field.and_then(|f| f.width.clone()),
                wrap: field.map_or(false, |f| f.wrap),
                calc: field.and_then(|f| f.calc),
            }
        })
        .collect()
}

fn card_fields(view: &View, index: &RowIndex<'_>) -> Vec<CardField> {
    ordered_keys(view, index)
        .into_iter()
        .map(|key| CardField {
            key: key.clone(),
            hidden: view.field(&key.id).map_or(false, |f| f.hidden),
        })
        .collect()
}

fn cells_of(index: &RowIndex<'_>, keys: &[&Key], pos: RowPos) -> Vec<ViewCell> {
    keys.iter()
        .map(|key| ViewCell {
            key_id: key.id.clone(),
            value: index.value_or_empty(key, pos),
        })
        .collect()
}

fn cards_of(
    view: &View,
    index: &RowIndex<'_>,
    fields: &[CardField],
    rows: &[RowPos],
    with_cover: bool,
) -> Vec<Card> {
    let visible: Vec<&Key> = fields.iter().filter(|f| !f.hidden).map(|f| &f.key).collect();
    rows.iter()
        .map(|&pos| Card {
            id: index.row_id(pos).to_string(),
            cover: if with_cover { cover_of(view, index, pos) } else { None },
            values: cells_of(index, &visible, pos),
        })
        .collect()
}

/// First asset of the configured cover key.
fn cover_of(view: &View, index: &RowIndex<'_>, pos: RowPos) -> Option<String> {
    if view.cards.cover_from != CoverFrom::AssetField {
        return None;
    }
    let key_id = view.cards.cover_key_id.as_deref()?;
    match &index.value(key_id, pos)?.data {
        ValueData::MAsset { assets } => assets.first().map(|a| a.content.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrview::{Asset, AttributeView, KeyType, ViewField};

    fn fixture() -> AttributeView {
        let mut av = AttributeView::new("av", "Photos");
        av.add_key(Key::new("name", "Name", KeyType::Block));
        av.add_key(Key::new("img", "Image", KeyType::MAsset));
        av.add_key(Key::new("note", "Note", KeyType::Text));
        av.set_value("name", "r1", ValueData::Block { content: "Beach".into() });
        av.set_value("name", "r2", ValueData::Block { content: "Hill".into() });
        av.set_value(
            "img",
            "r1",
            ValueData::MAsset {
                assets: vec![Asset { kind: "image".into(), name: String::new(), content: "assets/beach.png".into() }],
            },
        );
        av
    }

    #[test]
    fn test_table_columns_follow_view_fields_then_schema() {
        let av = fixture();
        let index = RowIndex::new(&av);
        let mut view = View::new("v", "Grid", LayoutType::Table);
        let mut note = ViewField::new("note");
        note.hidden = true;
        view.fields = vec![note, ViewField::new("name")];

        let viewable = materialize(LayoutType::Table, &view, &index, &[1, 0], Vec::new());
        let Viewable::Table(table) = viewable else { panic!("expected table") };
        let ids: Vec<&str> = table.columns.iter().map(|c| c.key.id.as_str()).collect();
        assert_eq!(ids, vec!["note", "name", "img"]);
        assert_eq!(table.rows[0].id, "r2");
        // Hidden columns carry no cells.
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.row_count, 2);
    }

    #[test]
    fn test_gallery_cover_from_asset_field() {
        let av = fixture();
        let index = RowIndex::new(&av);
        let mut view = View::new("v", "Cards", LayoutType::Gallery);
        view.cards.cover_from = CoverFrom::AssetField;
        view.cards.cover_key_id = Some("img".into());

        let viewable = materialize(LayoutType::Gallery, &view, &index, &index.all_rows(), Vec::new());
        let Viewable::Gallery(gallery) = viewable else { panic!("expected gallery") };
        assert_eq!(gallery.cards[0].cover.as_deref(), Some("assets/beach.png"));
        assert_eq!(gallery.cards[1].cover, None);
        assert_eq!(gallery.card_count, 2);
    }
}
