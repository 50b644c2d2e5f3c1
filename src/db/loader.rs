use super::schema::BasePairTemplateFile;
use super::store::{DataStore, TemplateKey};
use crate::model::atom::Atom;
use crate::model::fragment::Fragment;
use crate::model::types::Point;
use std::collections::HashMap;

pub fn load_all_templates() -> DataStore {
    let mut fragments = HashMap::new();

    macro_rules! load_template {
        ($path:literal) => {
            let content = include_str!(concat!("../../templates/", $path));
            let fragment = parse_fragment(content)
                .unwrap_or_else(|e| panic!("Failed to parse template file '{}': {}", $path, e));

            let key = TemplateKey::of(&fragment);
            if fragments.insert(key, fragment).is_some() {
                panic!("Duplicate template slot found: {}", $path);
            }
        };
    }

    load_template!("B-DNA/PAM3-bases/MiddleBasePair.toml");

    load_template!("B-DNA/PAM5-bases/StartBasePair.toml");
    load_template!("B-DNA/PAM5-bases/MiddleBasePair.toml");
    load_template!("B-DNA/PAM5-bases/EndBasePair.toml");
    load_template!("B-DNA/PAM5-bases/SingleBasePair.toml");

    DataStore { fragments }
}

/// Parses a TOML template document into a canonical-pose fragment.
pub fn parse_fragment(content: &str) -> Result<Fragment, String> {
    let schema: BasePairTemplateFile = toml::from_str(content).map_err(|e| e.to_string())?;
    build_fragment(&schema)
}

fn build_fragment(schema: &BasePairTemplateFile) -> Result<Fragment, String> {
    let mut index = HashMap::new();
    for (i, atom) in schema.atoms.iter().enumerate() {
        if index.insert(atom.name.as_str(), i).is_some() {
            return Err(format!("duplicate atom name '{}'", atom.name));
        }
    }
    let resolve = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| format!("unknown atom name '{}'", name))
    };
    let check_direction = |direction: i8| {
        if (-1..=1).contains(&direction) {
            Ok(direction)
        } else {
            Err(format!("invalid bond direction {}", direction))
        }
    };

    let atoms = schema
        .atoms
        .iter()
        .map(|a| Atom::new(&a.name, a.kind, Point::from(a.pos)).with_tag(a.tag))
        .collect();

    let bonds = schema
        .bonds
        .iter()
        .map(|b| Ok((resolve(&b.a1)?, resolve(&b.a2)?, check_direction(b.direction)?)))
        .collect::<Result<Vec<_>, String>>()?;

    let open_bonds = schema
        .open_bonds
        .iter()
        .map(|o| {
            Ok((
                resolve(&o.anchor)?,
                Point::from(o.pos),
                check_direction(o.direction)?,
            ))
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(Fragment::new(
        schema.info.form,
        schema.info.model,
        schema.info.role,
        atoms,
        bonds,
        open_bonds,
    )
    .with_geometry(schema.info.rise, schema.info.bases_per_turn)
    .with_offsets(schema.info.theta_offset, schema.info.z_offset))
}
