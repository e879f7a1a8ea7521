//! Phase four: the world itself turns on the player.

use minefriend_domain::{ActorCommand, ActorInfo, ActorKind, ActorQuery, SoundEffect};

use super::context::ScareContext;

impl ScareContext<'_> {
    fn around(&self, radius: f64, query: &ActorQuery) -> Vec<ActorInfo> {
        self.world
            .nearby_actors(self.world_id(), self.player.position, radius, query)
    }

    fn command(&self, actor: &ActorInfo, command: ActorCommand) {
        self.world.command_actor(self.world_id(), actor.id, command);
    }

    pub(super) fn golems_hostile(&self) -> bool {
        let golems = self.around(16.0, &ActorQuery::of(&[ActorKind::IronGolem]));
        for golem in &golems {
            self.command(
                golem,
                ActorCommand::Target {
                    player: self.player.id,
                },
            );
        }
        !golems.is_empty()
    }

    pub(super) fn upset_pets(&self) -> bool {
        let pets = self.around(
            16.0,
            &ActorQuery::of(&[ActorKind::Wolf, ActorKind::Cat]).owned_by(self.player.id),
        );
        for pet in &pets {
            let effect = if pet.kind == ActorKind::Cat {
                SoundEffect::CatHiss
            } else {
                SoundEffect::WolfGrowl
            };
            self.command(pet, ActorCommand::Sit);
            self.command(
                pet,
                ActorCommand::PlaySound {
                    cue: self.cue(effect, 0.8, 0.6, 0.2),
                },
            );
        }
        !pets.is_empty()
    }

    pub(super) fn spook_villagers(&self) -> bool {
        let villagers = self.around(16.0, &ActorQuery::of(&[ActorKind::Villager]));
        for villager in &villagers {
            let target = villager.position.away_from(&self.player.position, 1.5);
            self.command(villager, ActorCommand::MoveTo { target, speed: 1.2 });
            self.command(
                villager,
                ActorCommand::PlaySound {
                    cue: self.cue(SoundEffect::VillagerNo, 1.0, 0.6, 0.2),
                },
            );
        }
        !villagers.is_empty()
    }

    pub(super) fn panic_passive_mobs(&self) -> bool {
        let animals = self.around(12.0, &ActorQuery::of(&[ActorKind::PassiveAnimal]));
        for animal in &animals {
            let target = animal.position.away_from(&self.player.position, 4.0);
            self.command(animal, ActorCommand::MoveTo { target, speed: 1.1 });
        }
        !animals.is_empty()
    }
}
