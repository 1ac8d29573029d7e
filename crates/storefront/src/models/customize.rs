//! Customization form model and design prompt generation.
//!
//! The customization flow is a three-step stepper: fill in the figurine
//! details, generate a design prompt to paste into an image generator,
//! then upload the resulting image.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default background colour used when the customer skips the picker.
pub const DEFAULT_BACKGROUND_COLOR: &str = "bleu clair";

/// In-progress customization form, persisted in the session between steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomizationForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub posture: String,
    #[serde(default)]
    pub habillement: String,
    #[serde(default)]
    pub accessoire1: String,
    #[serde(default)]
    pub accessoire2: String,
    #[serde(default)]
    pub accessoire3: String,
    #[serde(default)]
    pub background_color: String,
}

impl CustomizationForm {
    /// Cart item title, falling back to the generic product name.
    #[must_use]
    pub fn item_title(&self) -> String {
        if self.title.trim().is_empty() {
            "Starter Pack Personnalisé".to_string()
        } else {
            self.title.clone()
        }
    }

    /// Build the French design prompt the customer pastes into an image
    /// generator along with their portrait photo.
    #[must_use]
    pub fn generate_prompt(&self) -> String {
        let background = if self.background_color.trim().is_empty() {
            DEFAULT_BACKGROUND_COLOR
        } else {
            self.background_color.as_str()
        };

        format!(
            "Crée un rendu 3D de haute qualité d'une figurine en style cartoon, présentée sous blister, à la manière d'un jouet de collection. Le fond en carton est {background} et porte une étiquette de jouet rétro. En haut au centre, en grandes lettres majuscules et en gras et noir, écris \"{title}\". Juste en dessous, tu peux écrire \"{subtitle}\" en plus petit en bas à droite. En haut à droite, un badge bleu circulaire indique \"ACTION FIGURE\". En haut à gauche, une petite bulle blanche indique \"4+\". En bas à droite, une mention discrète indique \"Made with ❤️ by www.mystarterpack.com\".\n\n\
             Le personnage se tient debout, moulé dans une boîte en plastique transparente fixée sur un support en carton plat. Il doit ressembler aux photos portrait fournies. L'expression de son visage est {expression}. Sa posture est {posture}. Le ton général est léger et réaliste.\n\n\
             La figurine est habillée de {habillement}. Sur le côté de la figurine, intégrés dans des moules en plastique distincts, sont présents 3 accessoires :\n\
             - {accessoire1} ;\n\
             - {accessoire2} ;\n\
             - {accessoire3}.\n\n\
             Chaque accessoire est vu de face, positionné à droite de la figurine et s'insère parfaitement dans son propre compartiment moulé. L'emballage est photographié avec des ombres douces, entièrement visible, un éclairage uniforme et un fond blanc épuré pour donner l'impression d'une séance photo commerciale.\n\n\
             Le style doit allier réalisme et stylisation du dessin animé 3D, à l'image de Pixar ou des maquettes de jouets modernes. Assure-toi que la disposition et les proportions du produit ressemblent à celles d'un véritable jouet vendu en magasin. Attache une attention toute particulière à ce que le visage de la figurine ressemble fidèlement à la photo portrait fournie. Reproduis fidèlement la forme du visage, la coupe de cheveux, les yeux et les expressions faciales tout en gardant une touche stylisée, légèrement caricatural.",
            background = background,
            title = self.title,
            subtitle = self.subtitle,
            expression = self.expression,
            posture = self.posture,
            habillement = self.habillement,
            accessoire1 = self.accessoire1,
            accessoire2 = self.accessoire2,
            accessoire3 = self.accessoire3,
        )
    }

    /// Flatten the form into the free-form map carried on cart items.
    #[must_use]
    pub fn to_form_data(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String(self.title.clone()));
        map.insert(
            "subtitle".to_string(),
            Value::String(self.subtitle.clone()),
        );
        map.insert(
            "expression".to_string(),
            Value::String(self.expression.clone()),
        );
        map.insert("posture".to_string(), Value::String(self.posture.clone()));
        map.insert(
            "habillement".to_string(),
            Value::String(self.habillement.clone()),
        );
        map.insert(
            "accessoire1".to_string(),
            Value::String(self.accessoire1.clone()),
        );
        map.insert(
            "accessoire2".to_string(),
            Value::String(self.accessoire2.clone()),
        );
        map.insert(
            "accessoire3".to_string(),
            Value::String(self.accessoire3.clone()),
        );
        map.insert(
            "backgroundColor".to_string(),
            Value::String(self.background_color.clone()),
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_title_fallback() {
        let form = CustomizationForm::default();
        assert_eq!(form.item_title(), "Starter Pack Personnalisé");

        let form = CustomizationForm {
            title: "SUPER HERO MIKE".to_string(),
            ..Default::default()
        };
        assert_eq!(form.item_title(), "SUPER HERO MIKE");
    }

    #[test]
    fn test_generate_prompt_interpolates_fields() {
        let form = CustomizationForm {
            title: "SUPER HERO MIKE".to_string(),
            subtitle: "Edition Limitée".to_string(),
            expression: "souriante et déterminée".to_string(),
            posture: "en position de combat".to_string(),
            habillement: "une combinaison bleue et rouge".to_string(),
            accessoire1: "un bouclier high-tech".to_string(),
            accessoire2: "un jet-pack futuriste".to_string(),
            accessoire3: "une arme laser".to_string(),
            background_color: "rouge foncé".to_string(),
        };

        let prompt = form.generate_prompt();
        assert!(prompt.contains("\"SUPER HERO MIKE\""));
        assert!(prompt.contains("Le fond en carton est rouge foncé"));
        assert!(prompt.contains("- un jet-pack futuriste ;"));
        assert!(prompt.contains("ACTION FIGURE"));
        assert!(prompt.contains("www.mystarterpack.com"));
    }

    #[test]
    fn test_generate_prompt_default_background() {
        let form = CustomizationForm::default();
        let prompt = form.generate_prompt();
        assert!(prompt.contains("Le fond en carton est bleu clair"));
    }

    #[test]
    fn test_to_form_data_keys() {
        let form = CustomizationForm {
            title: "TEST".to_string(),
            ..Default::default()
        };
        let map = form.to_form_data();
        assert_eq!(map.get("title"), Some(&Value::String("TEST".to_string())));
        assert!(map.contains_key("backgroundColor"));
        assert!(map.contains_key("accessoire3"));
    }
}
