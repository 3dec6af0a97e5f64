use std::{borrow::Borrow, collections::HashMap, hash::Hash};

/// Dictionary preserving insertion order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderDict<K,V>
    where K: Eq + Hash
{
    keys: HashMap<K,usize>,
    order: Vec<K>,
    values: Vec<V>
}

impl<K,V> OrderDict<K,V>
    where K: Eq + Hash + Clone
{

    pub fn new() -> Self {
        OrderDict { keys: HashMap::new(), order: Vec::new(), values: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Self {
        OrderDict { keys: HashMap::with_capacity(n), order: Vec::with_capacity(n), values: Vec::with_capacity(n) }
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized
    {
        self.keys.contains_key(k)
    }

    /// Insert a value: an existing key keeps its position
    pub fn insert(&mut self, k: K, v: V) {
        match self.keys.get(&k) {
            Some(i) => self.values[*i] = v,
            None => {
                self.keys.insert(k.clone(), self.values.len());
                self.order.push(k);
                self.values.push(v);
            }
        }
    }

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where K: Borrow<Q>, Q: Hash + Eq + ?Sized
    {
        let i = self.keys.get(k)?;
        Some(&self.values[*i])
    }

    #[allow(dead_code)]
    pub fn items(&self) -> impl Iterator<Item=(&K,&V)> {
        self.order.iter().zip(self.values.iter())
    }
}

impl<K,V> FromIterator<(K,V)> for OrderDict<K,V>
    where K: Eq + Hash + Clone
{
    fn from_iter<T: IntoIterator<Item = (K,V)>>(iter: T) -> Self {
        let mut dict = OrderDict::new();
        for (k,v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_kept() {
        let mut d: OrderDict<String,u32> = OrderDict::with_capacity(3);
        d.insert("z".to_owned(), 1);
        d.insert("a".to_owned(), 2);
        d.insert("m".to_owned(), 3);
        d.insert("a".to_owned(), 4);
        assert_eq!(d.get("a"), Some(&4));
        assert!(!d.contains_key("b"));
        let items: Vec<(&str, u32)> = d.items().map(|(k,v)| (k.as_str(), *v)).collect();
        assert_eq!(items, vec![("z", 1), ("a", 4), ("m", 3)]);
    }
}
