use std::cmp::Ordering;

use serde_json::{json, Map, Value};

pub const DEFAULT_LIMIT: usize = 30;

const CATEGORIES: &[(&str, &str)] = &[
    ("beauty", "Beauty"),
    ("groceries", "Groceries"),
    ("smartphones", "Smartphones"),
    ("laptops", "Laptops"),
];

const TITLES: &[&str] = &[
    "Essence Mascara Lash Princess",
    "Apple",
    "iPhone 9",
    "MacBook Pro",
    "eyeshadow Palette",
    "apple",
    "iPhone X",
    "Lenovo Yoga 920",
    "Powder Canister",
    "Beef Steak",
    "Samsung Universe 9",
    "Dell XPS 13",
    "Red Lipstick",
    "Cat Food",
    "Oppo F19",
    "Huawei Matebook X Pro",
    "Red Nail Polish",
    "Chicken Meat",
    "Phone Case",
    "Asus Zenbook",
    "Calvin Klein CK One",
    "Cooking Oil",
    "Realme XT",
    "New DELL XPS 13 9300",
    "Chanel Coco Noir",
    "Cucumber",
    "Vivo X21",
    "Apple MacBook Air",
    "Dior J'adore",
    "Dog Food",
    "Amazon Echo Plus",
    "Microsoft Surface Laptop 4",
    "Gucci Bloom",
    "eggs",
    "iPad Mini 2021",
    "Lenovo Yoga 920",
    "Nail Polish",
    "Fish Steak",
    "Samsung Galaxy S8",
    "HP Pavilion 15",
];

/// Listing parameters shared by every `/products` route.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub select: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Value>,
    id_tie_break: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::generated()
    }
}

impl Catalog {
    /// Deterministic catalog with mixed-case and duplicate titles, repeated
    /// prices and a few products without a brand.
    pub fn generated() -> Self {
        let products = TITLES
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let id = i as u64 + 1;
                let (slug, name) = CATEGORIES[i % CATEGORIES.len()];
                let mut product = Map::new();
                product.insert("id".into(), json!(id));
                product.insert("title".into(), json!(title));
                product.insert(
                    "description".into(),
                    json!(format!("{} from the {} range.", title, name)),
                );
                product.insert("category".into(), json!(slug));
                product.insert("price".into(), json!(((id * 37) % 20) as f64 + 0.99));
                product.insert("rating".into(), json!(((id * 13) % 50) as f64 / 10.0));
                product.insert("stock".into(), json!((id * 7) % 100));
                if id % 5 != 0 {
                    product.insert("brand".into(), json!(format!("Brand {}", id % 7)));
                }
                product.insert("tags".into(), json!([slug]));
                product.insert(
                    "thumbnail".into(),
                    json!(format!("https://cdn.example/products/{}/thumbnail.png", id)),
                );
                Value::Object(product)
            })
            .collect();
        Self::from_products(products)
    }

    pub fn from_products(products: Vec<Value>) -> Self {
        Self {
            products,
            id_tie_break: true,
        }
    }

    /// Sorted listings keep storage order among equal keys instead of
    /// falling back to ascending ids.
    pub fn without_id_tie_break(mut self) -> Self {
        self.id_tie_break = false;
        self
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product(&self, id: u64) -> Option<&Value> {
        self.products
            .iter()
            .find(|p| p.get("id").and_then(Value::as_u64) == Some(id))
    }

    pub fn categories(&self) -> Vec<(&'static str, &'static str)> {
        CATEGORIES
            .iter()
            .copied()
            .filter(|(slug, _)| self.in_category(slug).next().is_some())
            .collect()
    }

    fn in_category<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.products
            .iter()
            .filter(move |p| p.get("category").and_then(Value::as_str) == Some(slug))
    }

    pub fn list(&self, query: &ListQuery) -> Value {
        page(self.products.iter().collect(), query, self.id_tie_break)
    }

    pub fn search(&self, term: &str, query: &ListQuery) -> Value {
        let needle = term.trim().to_lowercase();
        let hits = self
            .products
            .iter()
            .filter(|p| {
                ["title", "description"].iter().any(|field| {
                    p.get(*field)
                        .and_then(Value::as_str)
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            })
            .collect();
        page(hits, query, self.id_tie_break)
    }

    pub fn by_category(&self, slug: &str, query: &ListQuery) -> Value {
        page(self.in_category(slug).collect(), query, self.id_tie_break)
    }
}

fn page(items: Vec<&Value>, query: &ListQuery, id_tie_break: bool) -> Value {
    let items = match &query.sort_by {
        Some(field) => sorted(items, field, query.descending, id_tie_break),
        None => items,
    };

    let total = items.len();
    let skip = query.skip.unwrap_or(0).min(total);
    let limit = match query.limit {
        Some(0) => total - skip,
        Some(n) => n,
        None => DEFAULT_LIMIT,
    };
    let products: Vec<Value> = items
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|p| project(p, query.select.as_deref()))
        .collect();

    json!({
        "total": total,
        "skip": skip,
        "limit": products.len(),
        "products": products,
    })
}

fn project(product: &Value, select: Option<&[String]>) -> Value {
    let Some(fields) = select else {
        return product.clone();
    };
    let mut out = Map::new();
    if let Some(id) = product.get("id") {
        out.insert("id".into(), id.clone());
    }
    for field in fields {
        if let Some(v) = product.get(field.as_str()) {
            out.insert(field.clone(), v.clone());
        }
    }
    Value::Object(out)
}

/// Field value as the service orders it: blanks first in text listings,
/// numeric coercion (blank as 0) once any number or bool is present.
#[derive(Debug, PartialEq)]
enum FieldKey {
    Blank,
    Number(f64),
    Text(String),
    Other(String),
}

impl FieldKey {
    fn of(value: Option<&Value>, numeric: bool) -> Self {
        match value {
            Some(Value::Number(n)) => FieldKey::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::Bool(b)) => FieldKey::Number(if *b { 1.0 } else { 0.0 }),
            Some(Value::String(s)) if numeric && s.trim().is_empty() => FieldKey::Number(0.0),
            Some(Value::String(s)) if numeric => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => FieldKey::Number(n),
                _ => FieldKey::Text(s.to_lowercase()),
            },
            Some(Value::String(s)) if s.is_empty() => FieldKey::Blank,
            Some(Value::String(s)) => FieldKey::Text(s.to_lowercase()),
            None | Some(Value::Null) if numeric => FieldKey::Number(0.0),
            None | Some(Value::Null) => FieldKey::Blank,
            Some(other) => FieldKey::Other(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldKey::Blank => 0,
            FieldKey::Number(_) => 1,
            FieldKey::Text(_) => 2,
            FieldKey::Other(_) => 3,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldKey::Number(a), FieldKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (FieldKey::Text(a), FieldKey::Text(b)) | (FieldKey::Other(a), FieldKey::Other(b)) => {
                a.cmp(b)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn sorted<'a>(items: Vec<&'a Value>, field: &str, descending: bool, id_tie_break: bool) -> Vec<&'a Value> {
    let numeric = items
        .iter()
        .any(|p| matches!(p.get(field), Some(Value::Number(_) | Value::Bool(_))));
    let mut keyed: Vec<(FieldKey, &Value)> = items
        .into_iter()
        .map(|p| (FieldKey::of(p.get(field), numeric), p))
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| {
        let primary = ka.compare(kb);
        let primary = if descending { primary.reverse() } else { primary };
        if id_tie_break {
            primary.then_with(|| id_of(a).cmp(&id_of(b)))
        } else {
            primary
        }
    });
    keyed.into_iter().map(|(_, p)| p).collect()
}

fn id_of(product: &Value) -> u64 {
    product.get("id").and_then(Value::as_u64).unwrap_or(0)
}
